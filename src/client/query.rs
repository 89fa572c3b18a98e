use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::{Endpoint, Transport};
use crate::model::{HistoryEntry, QueryResult};
use crate::Result;

/// Natural-language queries against the backend
#[derive(Clone)]
pub struct QueryClient {
    transport: Arc<dyn Transport>,
}

impl QueryClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Run a query. A transport failure becomes an error-only result, so the
    /// caller has a single render path for server and client errors.
    ///
    /// Nothing here prevents overlapping calls; the orchestrator guards that.
    pub async fn run(&self, query_text: &str) -> QueryResult {
        let body = json!({ "query": query_text });
        match self.transport.post_json(Endpoint::Query, &body).await {
            Ok(response) => QueryResult::from_value(&response),
            Err(e) => {
                tracing::warn!("Query failed: {}", e);
                QueryResult::from_error(e.to_string())
            }
        }
    }

    /// Recent queries as recorded by the server
    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let response = self.transport.get_json(Endpoint::QueryHistory).await?;
        Ok(HistoryEntry::list_from_response(&response))
    }

    /// Raw health payload of the backend
    pub async fn health(&self) -> Result<Value> {
        self.transport.get_json(Endpoint::Health).await
    }
}
