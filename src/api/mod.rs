//! Backend API - the HTTP contract with the query engine service
//!
//! Every call is "fire one request, handle one response or one rejection":
//! - POST /api/schema/database    {connection_string}
//! - POST /api/ingest/documents   multipart, repeated `files` field
//! - GET  /api/ingest/status/{id}
//! - POST /api/query              {query}
//! - GET  /api/query/history
//! - GET  /health

pub mod http;
#[cfg(test)]
pub(crate) mod scripted;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

pub use http::HttpTransport;

/// Multipart field name the ingestion endpoint expects for every file
pub const FILES_FIELD: &str = "files";

/// Backend endpoints known to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    SchemaDatabase,
    IngestDocuments,
    IngestStatus(&'a str),
    Query,
    QueryHistory,
    Health,
}

impl<'a> Endpoint<'a> {
    /// Path segments below the base URL. Job ids are kept as a single segment.
    pub fn segments(&self) -> Vec<&'a str> {
        match *self {
            Endpoint::SchemaDatabase => vec!["api", "schema", "database"],
            Endpoint::IngestDocuments => vec!["api", "ingest", "documents"],
            Endpoint::IngestStatus(job_id) => vec!["api", "ingest", "status", job_id],
            Endpoint::Query => vec!["api", "query"],
            Endpoint::QueryHistory => vec!["api", "query", "history"],
            Endpoint::Health => vec!["health"],
        }
    }

    /// Unencoded path, used for logging
    pub fn path(&self) -> String {
        format!("/{}", self.segments().join("/"))
    }
}

impl std::fmt::Display for Endpoint<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// A file ready to be sent in a multipart body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a file from disk, naming the part after the file name
    pub async fn from_path(path: &std::path::Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { file_name, bytes })
    }
}

/// Transport seam between the clients and the network.
///
/// Response bodies are returned as untyped JSON whatever the HTTP status;
/// interpreting them is the clients' job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, endpoint: Endpoint<'_>) -> Result<Value>;

    async fn post_json(&self, endpoint: Endpoint<'_>, body: &Value) -> Result<Value>;

    async fn post_files(&self, endpoint: Endpoint<'_>, field: &str, files: Vec<FilePart>) -> Result<Value>;
}
