use crate::{emit, OutputMode};
use nlqe::config::{self, NlqeConfig};
use nlqe::model::{JobId, StatusOutcome, UploadOutcome};
use nlqe::orchestrator::{Action, Orchestrator, Update};
use nlqe::session::IngestStatus;
use nlqe::ui::{self, print_update, Spinner};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Run one action to completion, with a spinner in human mode
async fn perform(orch: &mut Orchestrator, output_mode: OutputMode, action: Action, label: &str) -> Update {
    let spinner = output_mode.is_human().then(|| Spinner::new(label));
    let update = orch.perform(action).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    update
}

/// Whether an update means the command did what was asked
fn succeeded(update: &Update) -> bool {
    match update {
        Update::Refused(_) | Update::Failed { .. } => false,
        Update::Schema(outcome) => !outcome.is_failure(),
        Update::Uploaded(outcome) => !matches!(outcome, UploadOutcome::Failed { .. }),
        Update::Status(IngestStatus::Polled(StatusOutcome::Failed { .. })) => false,
        Update::Result(model) => !model.is_error(),
        _ => true,
    }
}

fn update_json(update: &Update) -> anyhow::Result<Value> {
    let data = match update {
        Update::Started(_) | Update::Discarded(_) => Value::Null,
        Update::Refused(message) | Update::Idle(message) => json!({ "message": message }),
        Update::Schema(outcome) => serde_json::to_value(outcome)?,
        Update::Uploaded(outcome) => serde_json::to_value(outcome)?,
        Update::Status(status) => serde_json::to_value(status)?,
        Update::Result(model) => serde_json::to_value(model)?,
        Update::History(entries) => serde_json::to_value(entries)?,
        Update::Health(payload) => payload.clone(),
        Update::Failed { message, .. } => json!({ "error": message }),
    };
    Ok(data)
}

fn finish(orch: &Orchestrator, output_mode: OutputMode, command: &str, update: Update) -> anyhow::Result<bool> {
    let ok = succeeded(&update);
    if output_mode.is_human() {
        let job = orch.session().job.as_ref().map(JobId::to_string);
        print_update(&update, job.as_deref());
    } else {
        emit(output_mode, command, ok, update_json(&update)?)?;
    }
    Ok(ok)
}

pub async fn run_connect(
    orch: &mut Orchestrator,
    output_mode: OutputMode,
    connection_string: String,
) -> anyhow::Result<bool> {
    tracing::debug!("Connecting with {:?}", connection_string);
    let update = perform(orch, output_mode, Action::Connect(connection_string), "Discovering schema...").await;
    finish(orch, output_mode, "connect", update)
}

pub async fn run_upload(orch: &mut Orchestrator, output_mode: OutputMode, files: Vec<PathBuf>) -> anyhow::Result<bool> {
    let label = format!("Uploading {} file(s)...", files.len());
    let update = perform(orch, output_mode, Action::Upload(files), &label).await;
    finish(orch, output_mode, "upload", update)
}

pub async fn run_status(orch: &mut Orchestrator, output_mode: OutputMode, job: String) -> anyhow::Result<bool> {
    orch.track_job(JobId::new(job));
    let update = perform(orch, output_mode, Action::PollStatus, "Checking status...").await;
    finish(orch, output_mode, "status", update)
}

pub async fn run_query(orch: &mut Orchestrator, output_mode: OutputMode, text: String) -> anyhow::Result<bool> {
    let action = Action::Query { text, replace: false };
    let update = perform(orch, output_mode, action, "Running query...").await;
    finish(orch, output_mode, "query", update)
}

pub async fn run_history(orch: &mut Orchestrator, output_mode: OutputMode) -> anyhow::Result<bool> {
    let update = perform(orch, output_mode, Action::History, "Fetching history...").await;
    finish(orch, output_mode, "history", update)
}

pub async fn run_health(orch: &mut Orchestrator, output_mode: OutputMode) -> anyhow::Result<bool> {
    let update = perform(orch, output_mode, Action::Health, "Checking backend...").await;
    finish(orch, output_mode, "health", update)
}

pub fn run_init(output_mode: OutputMode, path: &Path, config: &NlqeConfig, force: bool) -> anyhow::Result<()> {
    config::write_config(path, config, force)?;

    if output_mode.is_human() {
        ui::success(&format!("Wrote {}", path.display()));
        if let Some(base_url) = &config.base_url {
            ui::info("Backend", base_url);
        }
        if let Some(conn) = &config.connection_string {
            ui::info("Connection", conn);
        }
    } else {
        emit(
            output_mode,
            "init",
            true,
            json!({
                "path": path.display().to_string(),
                "config": config,
            }),
        )?;
    }
    Ok(())
}
