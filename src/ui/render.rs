//! Text rendering for session updates
//!
//! Formatting functions return strings so they can be tested; `print_update`
//! writes them out.

use owo_colors::OwoColorize;
use serde_json::Value;

use crate::model::{display_value, ConnectOutcome, HistoryEntry, UploadOutcome};
use crate::orchestrator::{Update, Workflow};
use crate::session::IngestStatus;
use crate::shape::{RenderModel, ResultView};
use crate::ui::table::{history_table, result_table, TableBuilder};
use crate::ui::{self, theme, Icons};

const MISSING: &str = "-";

pub fn format_schema(schema: &Value) -> String {
    serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string())
}

pub fn format_connect(outcome: &ConnectOutcome) -> String {
    let mut out = outcome.message();
    if let Some(schema) = outcome.schema() {
        out.push('\n');
        out.push_str(&format_schema(schema));
    }
    out
}

pub fn format_status(status: &IngestStatus, job: Option<&str>) -> String {
    let mut out = status.text();
    if let IngestStatus::Polled(crate::model::StatusOutcome::Report { report }) = status {
        out = format!("[{}] {}", report.state, out);
        if let Some(p) = &report.progress {
            out.push_str(&format!(
                "\n  processed {}/{}  vectors {}  errors {}",
                p.processed, p.total, p.vectors, p.errors
            ));
        }
    }
    if let Some(job) = job {
        out.push_str(&format!("\n  Job: {}", job));
    }
    out
}

pub fn format_result(model: &RenderModel) -> String {
    match model {
        RenderModel::Error { message } => format!("{} {}", Icons::CROSS, message.style(theme().failure.clone())),
        RenderModel::Normal(view) => format_view(view),
    }
}

fn format_view(view: &ResultView) -> String {
    let mut lines = Vec::new();
    if let Some(query) = &view.query {
        lines.push(format!("{} {}", ui::dim("Query:"), query));
    }
    lines.push(format!("{} {}", ui::dim("Type:"), view.kind.as_deref().unwrap_or(MISSING)));
    lines.push(format!("{} {}", ui::dim("Metrics:"), view.metrics.as_deref().unwrap_or(MISSING)));

    if view.has_table() {
        lines.push(String::new());
        lines.push(format!("━{}━", "Table Results".style(theme().heading.clone())));
        if view.columns.is_empty() {
            lines.push(ui::muted(&format!("{} rows without columns", view.rows.len())));
        } else {
            lines.push(result_table(&view.columns, &view.rows));
        }
    }

    if view.has_docs() {
        lines.push(String::new());
        lines.push(format!("━{}━", "Document Hits".style(theme().heading.clone())));
        for hit in &view.doc_hits {
            lines.push(format!(
                "{} Score: {} • Source: {}",
                Icons::FILE,
                hit.score.style(theme().score.clone()),
                hit.source
            ));
            lines.push(format!("  {}", hit.text));
        }
    }

    if !view.has_table() && !view.has_docs() {
        lines.push(ui::muted(&format!("{} No rows or documents returned.", Icons::EMPTY)));
    }

    lines.join("\n")
}

pub fn format_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return format!("{} No queries recorded yet.", Icons::EMPTY);
    }
    history_table(entries)
}

/// Health payloads are usually flat objects; show them as a Metric/Value table
pub fn format_health(payload: &Value) -> String {
    match payload.as_object() {
        Some(map) if !map.is_empty() => {
            let mut table = TableBuilder::new();
            for (key, value) in map {
                table.add_row(key, &display_value(value));
            }
            table.build()
        }
        _ => format_schema(payload),
    }
}

/// Print an update as it arrives
pub fn print_update(update: &Update, job: Option<&str>) {
    match update {
        Update::Started(workflow) => println!("{} {}", Icons::HOURGLASS, ui::dim(workflow.running_label())),
        Update::Refused(message) => ui::warn(message),
        Update::Idle(message) => ui::status(Icons::INFO, "Nothing to do", message),
        Update::Schema(outcome) => match outcome {
            ConnectOutcome::Failed { .. } => ui::error(&outcome.message()),
            _ => {
                ui::section("Schema");
                println!("{} {}", Icons::DATABASE, format_connect(outcome));
            }
        },
        Update::Uploaded(outcome) => match outcome {
            UploadOutcome::Failed { .. } => ui::error(&outcome.message()),
            UploadOutcome::Created { job, files_processed } => {
                ui::success(&outcome.message());
                ui::summary_row("Job:", job.as_str());
                if let Some(count) = files_processed {
                    ui::summary_row("Files:", &count.to_string());
                }
            }
            _ => ui::warn(&outcome.message()),
        },
        Update::Status(status) => {
            println!("{} {}", Icons::STATS, format_status(status, job));
            if let IngestStatus::Polled(crate::model::StatusOutcome::Report { report }) = status {
                ui::progress::show_job_progress(report.state, report.progress.as_ref());
            }
        }
        Update::Result(model) => {
            ui::section("Results");
            println!("{}", format_result(model));
        }
        Update::History(entries) => {
            ui::section(&format!("{} Query History", Icons::SCROLL));
            println!("{}", format_history(entries));
        }
        Update::Health(payload) => {
            println!("{} Backend is up", Icons::HEART);
            println!("{}", format_health(payload));
        }
        Update::Failed { workflow, message } => {
            ui::error(&format!("{} failed: {}", workflow_name(*workflow), message));
        }
        Update::Discarded(_) => {}
    }
}

fn workflow_name(workflow: Workflow) -> &'static str {
    match workflow {
        Workflow::Connect => "Schema discovery",
        Workflow::Upload => "Upload",
        Workflow::Status => "Status check",
        Workflow::Query => "Query",
        Workflow::History => "History",
        Workflow::Health => "Health check",
    }
}
