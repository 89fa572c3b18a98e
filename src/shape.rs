//! Result shaping - from an arbitrary query payload to a display-safe model
//!
//! Shaping is total: every field access is guarded and anything missing or
//! malformed degenerates to "nothing rendered for that section".
//!
//! Rules:
//! - an `error` supersedes every other field
//! - rows are `results` when it is an array, columns are the keys of the first row
//! - doc hits are `docs` when it is an array; scores get three decimals and
//!   text is cut at 400 characters

use serde::Serialize;
use serde_json::Value;

use crate::model::{compact_json, display_value, QueryResult};

/// Maximum number of characters of a document hit shown before truncation
pub const DOC_TEXT_LIMIT: usize = 400;

/// Appended to truncated document text
pub const ELLIPSIS: &str = "...";

/// Cell text for a key the row does not have
pub const ABSENT: &str = "undefined";

/// Score text when the hit carries no usable number
pub const NO_SCORE: &str = "n/a";

/// Normalized, display-safe projection of a query result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum RenderModel {
    Error { message: String },
    Normal(ResultView),
}

impl RenderModel {
    pub fn is_error(&self) -> bool {
        matches!(self, RenderModel::Error { .. })
    }

    pub fn view(&self) -> Option<&ResultView> {
        match self {
            RenderModel::Normal(view) => Some(view),
            RenderModel::Error { .. } => None,
        }
    }
}

impl From<&QueryResult> for RenderModel {
    fn from(result: &QueryResult) -> Self {
        ResultShaper::shape(result)
    }
}

/// The non-error render path: summary line, optional table, optional doc list
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultView {
    pub query: Option<String>,
    pub kind: Option<String>,
    /// Metrics serialized as compact JSON
    pub metrics: Option<String>,
    pub columns: Vec<String>,
    /// One entry per row, one cell per column
    pub rows: Vec<Vec<String>>,
    pub doc_hits: Vec<DocHitView>,
}

impl ResultView {
    pub fn has_table(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn has_docs(&self) -> bool {
        !self.doc_hits.is_empty()
    }
}

/// A document hit ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocHitView {
    pub score: String,
    pub source: String,
    pub text: String,
    pub truncated: bool,
}

pub struct ResultShaper;

impl ResultShaper {
    /// Derive the render model. Never panics, whatever the payload holds.
    pub fn shape(result: &QueryResult) -> RenderModel {
        if let Some(message) = &result.error {
            return RenderModel::Error { message: message.clone() };
        }

        let rows = as_sequence(result.results.as_ref());
        let columns = Self::columns(rows);
        let rows = rows
            .iter()
            .map(|row| columns.iter().map(|c| cell_text(row, c)).collect())
            .collect();

        let doc_hits = as_sequence(result.docs.as_ref())
            .iter()
            .map(Self::doc_hit)
            .collect();

        RenderModel::Normal(ResultView {
            query: result.query.clone(),
            kind: result.kind.clone(),
            metrics: result.metrics.as_ref().map(compact_json),
            columns,
            rows,
            doc_hits,
        })
    }

    /// Column set taken from the first row, in server order
    fn columns(rows: &[Value]) -> Vec<String> {
        rows.first()
            .and_then(Value::as_object)
            .map(|first| first.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn doc_hit(hit: &Value) -> DocHitView {
        let score = hit
            .get("score")
            .and_then(Value::as_f64)
            .map(score_text)
            .unwrap_or_else(|| NO_SCORE.to_string());

        let text = match hit.get("text") {
            None | Some(Value::Null) => String::new(),
            Some(value) => display_value(value),
        };
        let (text, truncated) = truncate_text(&text);

        DocHitView {
            score,
            source: cell_text(hit, "source"),
            text,
            truncated,
        }
    }
}

/// Three decimals, with exact halves rounded away from zero
pub fn score_text(score: f64) -> String {
    let scaled = score * 1000.0;
    // a score can only sit exactly on a half when it is a multiple of 1/16
    if (score * 16.0).fract() == 0.0 && scaled.fract().abs() == 0.5 {
        let rounded = scaled.trunc() + scaled.signum();
        return format!("{:.3}", rounded / 1000.0);
    }
    format!("{:.3}", score)
}

fn as_sequence(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Stringify one cell: missing keys and non-object rows read as absent
pub fn cell_text(row: &Value, column: &str) -> String {
    match row.get(column) {
        None => ABSENT.to_string(),
        Some(value) => display_value(value),
    }
}

/// Cut text at [`DOC_TEXT_LIMIT`] characters, appending [`ELLIPSIS`] when cut
pub fn truncate_text(text: &str) -> (String, bool) {
    match text.char_indices().nth(DOC_TEXT_LIMIT) {
        Some((end, _)) => (format!("{}{}", &text[..end], ELLIPSIS), true),
        None => (text.to_string(), false),
    }
}
