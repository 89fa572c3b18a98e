//! Client-side data model
//!
//! Server responses carry no declared schema, so each entity is an
//! optional-field structure built from untyped JSON with explicit defaulting
//! rules. Construction from a response never fails.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Connection string used by the "demo" preset
pub const DEMO_CONNECTION: &str = "sqlite:///./demo_db.sqlite";

/// Render text for a JSON value: strings verbatim, everything else as compact JSON
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => compact_json(other),
    }
}

/// Number text as a browser shows it: integral floats lose their `.0`
pub fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Compact JSON with numbers written by [`number_text`]; key order is kept
pub fn compact_json(value: &Value) -> String {
    let mut out = String::new();
    write_json(value, &mut out);
    out
}

fn write_json(value: &Value, out: &mut String) {
    match value {
        Value::Number(n) => out.push_str(&number_text(n)),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_json(item, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Whether a value counts as "set" when deciding render paths.
///
/// null, false, 0 and the empty string are unset.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Opaque server-side job identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display state produced by a schema-discovery call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConnectOutcome {
    /// The backend returned a schema, kept as an opaque value
    Schema { schema: Value },
    /// Well-formed response without a schema; informational, not an error
    NoSchema { reason: Option<String> },
    /// Transport failure, carrying the stringified cause
    Failed { message: String },
}

impl ConnectOutcome {
    pub fn from_response(response: &Value) -> Self {
        match non_null(response.get("schema")).filter(|v| is_truthy(v)) {
            Some(schema) => ConnectOutcome::Schema { schema: schema.clone() },
            None => ConnectOutcome::NoSchema {
                reason: non_null(response.get("error"))
                    .filter(|e| is_truthy(e))
                    .map(display_value),
            },
        }
    }

    pub fn failed(cause: impl fmt::Display) -> Self {
        ConnectOutcome::Failed { message: cause.to_string() }
    }

    pub fn schema(&self) -> Option<&Value> {
        match self {
            ConnectOutcome::Schema { schema } => Some(schema),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ConnectOutcome::Failed { .. })
    }

    /// One-line status message
    pub fn message(&self) -> String {
        match self {
            ConnectOutcome::Schema { .. } => "Schema discovered".to_string(),
            ConnectOutcome::NoSchema { reason: None } => "No schema returned".to_string(),
            ConnectOutcome::NoSchema { reason: Some(reason) } => {
                format!("No schema returned ({})", reason)
            }
            ConnectOutcome::Failed { message } => format!("Error: {}", message),
        }
    }
}

/// Result of a document upload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UploadOutcome {
    /// No files were given, nothing was sent
    Skipped,
    Created {
        job: JobId,
        files_processed: Option<u64>,
    },
    /// Well-formed response without a job id
    NoJob,
    Failed { message: String },
}

impl UploadOutcome {
    pub fn from_response(response: &Value) -> Self {
        let job = non_null(response.get("job_id"))
            .filter(|v| is_truthy(v))
            .map(|v| JobId::new(display_value(v)));
        match job {
            Some(job) => UploadOutcome::Created {
                job,
                files_processed: response.get("files_processed").and_then(Value::as_u64),
            },
            None => UploadOutcome::NoJob,
        }
    }

    pub fn failed(cause: impl fmt::Display) -> Self {
        UploadOutcome::Failed { message: cause.to_string() }
    }

    pub fn job(&self) -> Option<&JobId> {
        match self {
            UploadOutcome::Created { job, .. } => Some(job),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            UploadOutcome::Skipped => "No files selected".to_string(),
            UploadOutcome::Created { .. } => "Processing started".to_string(),
            UploadOutcome::NoJob => "Upload accepted but no job id returned".to_string(),
            UploadOutcome::Failed { message } => format!("Error: {}", message),
        }
    }
}

/// Lifecycle state of an ingestion job, decoded from the status payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    /// Whether the job is still running; drives the progress indicator
    pub fn is_active(&self) -> bool {
        matches!(self, JobState::Pending | JobState::Processing)
    }

    fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "pending" | "queued" | "created" => Some(JobState::Pending),
            "processing" | "running" | "in_progress" | "started" => Some(JobState::Processing),
            "completed" | "complete" | "done" | "success" | "succeeded" => Some(JobState::Completed),
            "failed" | "failure" | "error" => Some(JobState::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Pending => "pending",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Counters reported by the ingestion service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobProgress {
    pub total: u64,
    pub processed: u64,
    pub vectors: u64,
    pub errors: u64,
    pub done: bool,
}

impl JobProgress {
    pub fn state(&self) -> JobState {
        if self.done {
            if self.total > 0 && self.errors >= self.total {
                JobState::Failed
            } else {
                JobState::Completed
            }
        } else if self.processed > 0 {
            JobState::Processing
        } else {
            JobState::Pending
        }
    }
}

/// A polled ingestion status: the raw payload plus what could be decoded from it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    pub job: JobId,
    pub state: JobState,
    pub progress: Option<JobProgress>,
    pub raw: Value,
}

impl StatusReport {
    pub fn from_response(job: JobId, raw: Value) -> Self {
        let node = raw.get("status").unwrap_or(&raw);
        let (state, progress) = match node {
            Value::String(label) => (JobState::from_label(label).unwrap_or(JobState::Pending), None),
            Value::Object(map) => {
                let labelled = map
                    .get("state")
                    .and_then(Value::as_str)
                    .and_then(JobState::from_label);
                let progress = serde_json::from_value::<JobProgress>(node.clone()).ok();
                let state = labelled
                    .or_else(|| progress.as_ref().map(JobProgress::state))
                    .unwrap_or(JobState::Pending);
                (state, progress)
            }
            _ => (JobState::Pending, None),
        };
        Self {
            job,
            state,
            progress,
            raw,
        }
    }

    /// The payload serialized to text, as displayed to the user
    pub fn text(&self) -> String {
        compact_json(&self.raw)
    }
}

/// Result of a status poll
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StatusOutcome {
    Report { report: StatusReport },
    Failed { job: JobId, message: String },
}

impl StatusOutcome {
    pub fn job(&self) -> &JobId {
        match self {
            StatusOutcome::Report { report } => &report.job,
            StatusOutcome::Failed { job, .. } => job,
        }
    }

    /// Whether the progress indicator should be shown
    pub fn is_active(&self) -> bool {
        match self {
            StatusOutcome::Report { report } => report.state.is_active(),
            StatusOutcome::Failed { .. } => false,
        }
    }

    pub fn message(&self) -> String {
        match self {
            StatusOutcome::Report { report } => report.text(),
            StatusOutcome::Failed { message, .. } => format!("Error: {}", message),
        }
    }
}

/// A natural-language query result.
///
/// `results` and `docs` are kept untyped: the server may send anything and the
/// shaper decides what is renderable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    /// Synthetic error-only result
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| non_null(value.get(name));
        Self {
            query: field("query").and_then(Value::as_str).map(str::to_string),
            kind: field("type").map(display_value),
            metrics: field("metrics").cloned(),
            results: field("results").cloned(),
            docs: field("docs").cloned(),
            error: field("error").filter(|e| is_truthy(e)).map(display_value),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl From<Value> for QueryResult {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

/// One entry of the server-side query history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryEntry {
    pub q: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub time: Option<f64>,
}

impl HistoryEntry {
    /// Decode a history listing; entries that do not fit are skipped
    pub fn list_from_response(response: &Value) -> Vec<Self> {
        response
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|e| serde_json::from_value(e.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connect_outcome_schema() {
        let outcome = ConnectOutcome::from_response(&json!({"ok": true, "schema": {"tables": {}}}));
        assert_eq!(outcome.schema(), Some(&json!({"tables": {}})));
        assert_eq!(outcome.message(), "Schema discovered");
    }

    #[test]
    fn test_connect_outcome_degenerate() {
        let outcome = ConnectOutcome::from_response(&json!({}));
        assert_eq!(outcome, ConnectOutcome::NoSchema { reason: None });
        assert_eq!(outcome.message(), "No schema returned");

        let outcome = ConnectOutcome::from_response(&json!({"ok": false, "error": "bad dsn", "schema": null}));
        assert_eq!(outcome.message(), "No schema returned (bad dsn)");
        assert!(!outcome.is_failure());
    }

    #[test]
    fn test_falsy_schema_is_no_schema() {
        for schema in [json!(""), json!(0), json!(false)] {
            let outcome = ConnectOutcome::from_response(&json!({ "schema": schema }));
            assert_eq!(outcome, ConnectOutcome::NoSchema { reason: None });
        }
        let outcome = ConnectOutcome::from_response(&json!({"schema": {}}));
        assert!(outcome.schema().is_some());
    }

    #[test]
    fn test_numbers_print_like_a_browser() {
        assert_eq!(display_value(&json!(75000.0)), "75000");
        assert_eq!(display_value(&json!(1.5)), "1.5");
        assert_eq!(display_value(&json!(-3)), "-3");
        assert_eq!(display_value(&json!(-0.0)), "0");
        assert_eq!(display_value(&json!(0.1)), "0.1");
        assert_eq!(
            compact_json(&json!({"time_seconds": 1.0, "rows": [2.0, 2.5], "note": "a\"b"})),
            r#"{"time_seconds":1,"rows":[2,2.5],"note":"a\"b"}"#
        );
    }

    #[test]
    fn test_connect_outcome_failure_message() {
        let outcome = ConnectOutcome::failed("connection refused");
        assert!(outcome.is_failure());
        assert_eq!(outcome.message(), "Error: connection refused");
    }

    #[test]
    fn test_upload_outcome() {
        let outcome = UploadOutcome::from_response(&json!({"job_id": "abc", "files_processed": 2}));
        assert_eq!(
            outcome,
            UploadOutcome::Created { job: JobId::new("abc"), files_processed: Some(2) }
        );
        assert_eq!(UploadOutcome::from_response(&json!({"detail": "nope"})), UploadOutcome::NoJob);
        assert_eq!(UploadOutcome::from_response(&json!({"job_id": ""})), UploadOutcome::NoJob);
    }

    #[test]
    fn test_status_from_counters() {
        let job = JobId::new("j");
        let raw = json!({"job_id": "j", "status": {"total": 2, "processed": 1, "vectors": 4, "errors": 0, "done": false}});
        let report = StatusReport::from_response(job.clone(), raw);
        assert_eq!(report.state, JobState::Processing);
        assert_eq!(report.progress.as_ref().map(|p| p.vectors), Some(4));

        let raw = json!({"status": {"total": 2, "processed": 2, "errors": 0, "done": true}});
        assert_eq!(StatusReport::from_response(job.clone(), raw).state, JobState::Completed);

        let raw = json!({"status": {"total": 2, "processed": 2, "errors": 2, "done": true}});
        assert_eq!(StatusReport::from_response(job.clone(), raw).state, JobState::Failed);

        let raw = json!({"status": {"total": 0, "processed": 0, "done": false}});
        assert_eq!(StatusReport::from_response(job, raw).state, JobState::Pending);
    }

    #[test]
    fn test_status_from_label() {
        let job = JobId::new("j");
        let report = StatusReport::from_response(job.clone(), json!({"status": "COMPLETED"}));
        assert_eq!(report.state, JobState::Completed);
        assert!(report.progress.is_none());
        assert!(!report.state.is_active());

        let report = StatusReport::from_response(job.clone(), json!({"status": "running"}));
        assert_eq!(report.state, JobState::Processing);

        let report = StatusReport::from_response(job, json!(["unexpected"]));
        assert_eq!(report.state, JobState::Pending);
        assert_eq!(report.text(), r#"["unexpected"]"#);
    }

    #[test]
    fn test_query_result_from_value() {
        let result = QueryResult::from_value(&json!({
            "query": "q",
            "type": "sql",
            "results": [{"a": 1}],
            "docs": null,
            "metrics": {"time_seconds": 0.1}
        }));
        assert_eq!(result.kind.as_deref(), Some("sql"));
        assert!(result.docs.is_none());
        assert!(!result.is_error());
    }

    #[test]
    fn test_query_result_error_truthiness() {
        assert!(QueryResult::from_value(&json!({"error": "boom"})).is_error());
        assert!(!QueryResult::from_value(&json!({"error": ""})).is_error());
        assert!(!QueryResult::from_value(&json!({"error": null})).is_error());
        assert_eq!(
            QueryResult::from_value(&json!({"error": {"code": 1}})).error.as_deref(),
            Some(r#"{"code":1}"#)
        );
        assert_eq!(QueryResult::from_value(&json!("not an object")), QueryResult::default());
    }

    #[test]
    fn test_history_skips_bad_entries() {
        let entries = HistoryEntry::list_from_response(&json!([
            {"q": "count employees", "type": "sql", "time": 0.02},
            "garbage",
            {"q": "find resumes"}
        ]));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind.as_deref(), Some("sql"));
        assert_eq!(entries[1].time, None);
        assert!(HistoryEntry::list_from_response(&json!({"not": "a list"})).is_empty());
    }
}
