//! # nlqe - NLP Query Engine client
//!
//! Terminal client for an NLP query engine backend.
//!
//! nlqe provides:
//! - Schema discovery for a data-source connection string
//! - Document upload with manually polled ingestion status
//! - Natural-language queries with mixed table/document rendering
//! - A result shaper that turns any server payload into a display-safe model
//! - An interactive shell whose orchestrator owns all session state

pub mod api;
pub mod client;
pub mod config;
pub mod model;
pub mod orchestrator;
pub mod output;
pub mod session;
pub mod shape;
pub mod shell;
pub mod ui;

// Re-exports for convenient access
pub use api::{HttpTransport, Transport};
pub use client::{ConnectionClient, IngestionClient, QueryClient};
pub use model::{ConnectOutcome, JobId, JobState, QueryResult, StatusOutcome, StatusReport, UploadOutcome};
pub use orchestrator::Orchestrator;
pub use shape::{RenderModel, ResultShaper, ResultView};

/// Result type alias for nlqe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for nlqe operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("No files to upload")]
    NoFiles,
}
