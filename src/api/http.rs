//! reqwest-backed transport

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde_json::Value;

use super::{Endpoint, FilePart, Transport};
use crate::{Error, Result};

/// HTTP transport bound to one base URL.
///
/// No timeouts, retries or auth headers are configured: failures surface only
/// as the transport's own rejection.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }
        let client = Client::builder().build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve an endpoint against the base URL, percent-encoding each segment
    pub fn url(&self, endpoint: Endpoint<'_>) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(endpoint.segments());
        Ok(url)
    }

    async fn decode(endpoint: Endpoint<'_>, response: Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("{} answered {}", endpoint, status);
        }
        let body = response.bytes().await?;
        let value = serde_json::from_slice(&body)?;
        Ok(value)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, endpoint: Endpoint<'_>) -> Result<Value> {
        let url = self.url(endpoint)?;
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::decode(endpoint, response).await
    }

    async fn post_json(&self, endpoint: Endpoint<'_>, body: &Value) -> Result<Value> {
        let url = self.url(endpoint)?;
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        Self::decode(endpoint, response).await
    }

    async fn post_files(&self, endpoint: Endpoint<'_>, field: &str, files: Vec<FilePart>) -> Result<Value> {
        let url = self.url(endpoint)?;
        tracing::debug!("POST {} ({} files)", url, files.len());
        let mut form = Form::new();
        for file in files {
            form = form.part(field.to_string(), Part::bytes(file.bytes).file_name(file.file_name));
        }
        let response = self.client.post(url).multipart(form).send().await?;
        Self::decode(endpoint, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_segments() {
        let transport = HttpTransport::new("http://localhost:8000").unwrap();
        let url = transport.url(Endpoint::SchemaDatabase).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/schema/database");
    }

    #[test]
    fn test_url_keeps_base_prefix() {
        let transport = HttpTransport::new("http://example.com/engine/").unwrap();
        let url = transport.url(Endpoint::Health).unwrap();
        assert_eq!(url.as_str(), "http://example.com/engine/health");
    }

    #[test]
    fn test_job_id_is_one_segment() {
        let transport = HttpTransport::new("http://localhost:8000").unwrap();
        let url = transport.url(Endpoint::IngestStatus("a/b c")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/ingest/status/a%2Fb%20c");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(HttpTransport::new("not a url"), Err(Error::InvalidBaseUrl(_))));
        assert!(matches!(HttpTransport::new("mailto:someone@example.com"), Err(Error::InvalidBaseUrl(_))));
    }
}
