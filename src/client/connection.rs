use serde_json::json;
use std::sync::Arc;

use crate::api::{Endpoint, Transport};
use crate::model::ConnectOutcome;

/// Schema discovery for a data-source connection string
#[derive(Clone)]
pub struct ConnectionClient {
    transport: Arc<dyn Transport>,
}

impl ConnectionClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Ask the backend to analyze a data source.
    ///
    /// The connection string is passed through verbatim, empty or not; the
    /// server is the authority on whether it is valid.
    pub async fn connect(&self, connection_string: &str) -> ConnectOutcome {
        let body = json!({ "connection_string": connection_string });
        match self.transport.post_json(Endpoint::SchemaDatabase, &body).await {
            Ok(response) => {
                let outcome = ConnectOutcome::from_response(&response);
                tracing::debug!("Schema discovery: {}", outcome.message());
                outcome
            }
            Err(e) => {
                tracing::warn!("Schema discovery failed: {}", e);
                ConnectOutcome::failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::scripted::{Reply, ScriptedTransport};

    fn client_with(transport: &Arc<ScriptedTransport>) -> ConnectionClient {
        ConnectionClient::new(transport.clone())
    }

    #[tokio::test]
    async fn test_connect_returns_schema() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply(
            "/api/schema/database",
            Reply::Json(json!({"ok": true, "schema": {"tables": {"employees": {}}}})),
        );

        let outcome = client_with(&transport).connect("sqlite:///./demo_db.sqlite").await;
        assert_eq!(outcome.schema(), Some(&json!({"tables": {"employees": {}}})));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "POST");
        assert_eq!(
            calls[0].body,
            Some(json!({"connection_string": "sqlite:///./demo_db.sqlite"}))
        );
    }

    #[tokio::test]
    async fn test_empty_connection_string_is_sent() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply("/api/schema/database", Reply::Json(json!({"schema": null})));

        let outcome = client_with(&transport).connect("").await;
        assert_eq!(outcome, ConnectOutcome::NoSchema { reason: None });
        assert_eq!(transport.calls()[0].body, Some(json!({"connection_string": ""})));
    }

    #[tokio::test]
    async fn test_transport_failure_is_caught() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.reply("/api/schema/database", Reply::Fail("connection refused".into()));

        let outcome = client_with(&transport).connect("postgresql://db").await;
        assert!(outcome.is_failure());
        assert!(outcome.message().starts_with("Error: "));
        assert!(outcome.message().contains("connection refused"));
    }
}
