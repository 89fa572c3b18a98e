//! Orchestrator - wires user actions to the clients and owns the session
//!
//! Every network call runs on its own tokio task and reports back through an
//! event channel. Only the orchestrator writes to the [`Session`], so each
//! workflow handler sees a single writer per field. Workflows are independent:
//! a schema connect can run while a query is outstanding.

use serde_json::Value;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::api::Transport;
use crate::client::{ConnectionClient, IngestionClient, QueryClient};
use crate::model::{ConnectOutcome, HistoryEntry, JobId, QueryResult, StatusOutcome, UploadOutcome};
use crate::session::{IngestStatus, Session, Ticket};
use crate::shape::{RenderModel, ResultShaper};

/// The workflows a user can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    Connect,
    Upload,
    Status,
    Query,
    History,
    Health,
}

impl Workflow {
    pub fn running_label(&self) -> &'static str {
        match self {
            Workflow::Connect => "Connecting...",
            Workflow::Upload => "Uploading...",
            Workflow::Status => "Checking status...",
            Workflow::Query => "Running...",
            Workflow::History => "Fetching history...",
            Workflow::Health => "Checking backend...",
        }
    }
}

/// A user action
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Connect(String),
    Upload(Vec<PathBuf>),
    PollStatus,
    /// `replace` supersedes an outstanding query instead of being refused
    Query { text: String, replace: bool },
    History,
    Health,
}

/// Completion of a spawned call
#[derive(Debug)]
pub enum Event {
    Connected { ticket: Ticket, outcome: ConnectOutcome },
    Uploaded { ticket: Ticket, outcome: UploadOutcome },
    Polled { ticket: Ticket, outcome: StatusOutcome },
    Answered { ticket: Ticket, result: QueryResult },
    History(Result<Vec<HistoryEntry>, String>),
    Health(Result<Value, String>),
}

/// What changed, for the presentation layer to render
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Started(Workflow),
    /// The action was rejected, e.g. a query while another one runs
    Refused(String),
    /// Nothing to do; no request was sent
    Idle(String),
    Schema(ConnectOutcome),
    Uploaded(UploadOutcome),
    Status(IngestStatus),
    Result(RenderModel),
    History(Vec<HistoryEntry>),
    Health(Value),
    Failed { workflow: Workflow, message: String },
    /// A response arrived for a request that has since been superseded
    Discarded(Workflow),
}

pub struct Orchestrator {
    connection: ConnectionClient,
    ingestion: IngestionClient,
    query: QueryClient,
    session: Session,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
    outstanding: usize,
}

impl Orchestrator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            connection: ConnectionClient::new(transport.clone()),
            ingestion: IngestionClient::new(transport.clone()),
            query: QueryClient::new(transport),
            session: Session::new(),
            events_tx,
            events_rx,
            outstanding: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Number of calls whose completion has not been applied yet
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Make an existing job current, e.g. one created by an earlier run
    pub fn track_job(&mut self, job: JobId) {
        if self.session.job.as_ref() != Some(&job) {
            self.session.job = Some(job);
            self.session.status.reset(IngestStatus::Message("Tracking job".to_string()));
        }
    }

    /// Start an action. Returns immediately; the completion arrives as an [`Event`].
    pub fn dispatch(&mut self, action: Action) -> Update {
        match action {
            Action::Connect(connection_string) => {
                let ticket = self.session.connection.begin();
                let client = self.connection.clone();
                self.spawn(async move {
                    let outcome = client.connect(&connection_string).await;
                    Event::Connected { ticket, outcome }
                });
                Update::Started(Workflow::Connect)
            }
            Action::Upload(paths) => {
                if paths.is_empty() {
                    return Update::Idle(UploadOutcome::Skipped.message());
                }
                if self.session.upload.is_busy() {
                    return Update::Refused("An upload is already in progress".to_string());
                }
                let ticket = self.session.upload.begin();
                let client = self.ingestion.clone();
                self.spawn(async move {
                    let outcome = client.upload_paths(&paths).await;
                    Event::Uploaded { ticket, outcome }
                });
                Update::Started(Workflow::Upload)
            }
            Action::PollStatus => {
                let Some(job) = self.session.job.clone() else {
                    return Update::Idle("No job yet, upload documents first".to_string());
                };
                let ticket = self.session.status.begin();
                let client = self.ingestion.clone();
                self.spawn(async move {
                    let outcome = client.poll_status(&job).await;
                    Event::Polled { ticket, outcome }
                });
                Update::Started(Workflow::Status)
            }
            Action::Query { text, replace } => {
                if self.session.result.is_busy() && !replace {
                    return Update::Refused(
                        "A query is already running (use `query!` to replace it)".to_string(),
                    );
                }
                let ticket = self.session.result.begin();
                let client = self.query.clone();
                self.spawn(async move {
                    let result = client.run(&text).await;
                    Event::Answered { ticket, result }
                });
                Update::Started(Workflow::Query)
            }
            Action::History => {
                let client = self.query.clone();
                self.spawn(async move {
                    Event::History(client.history().await.map_err(|e| e.to_string()))
                });
                Update::Started(Workflow::History)
            }
            Action::Health => {
                let client = self.query.clone();
                self.spawn(async move {
                    Event::Health(client.health().await.map_err(|e| e.to_string()))
                });
                Update::Started(Workflow::Health)
            }
        }
    }

    /// Wait for the next completion
    pub async fn next_event(&mut self) -> Option<Event> {
        self.events_rx.recv().await
    }

    /// Fold a completion into the session
    pub fn apply(&mut self, event: Event) -> Update {
        self.outstanding = self.outstanding.saturating_sub(1);
        match event {
            Event::Connected { ticket, outcome } => {
                if self.session.connection.complete(ticket, outcome.clone()) {
                    Update::Schema(outcome)
                } else {
                    self.discard(Workflow::Connect, ticket)
                }
            }
            Event::Uploaded { ticket, outcome } => {
                if self.session.apply_upload(ticket, outcome.clone()) {
                    Update::Uploaded(outcome)
                } else {
                    self.discard(Workflow::Upload, ticket)
                }
            }
            Event::Polled { ticket, outcome } => {
                let status = IngestStatus::Polled(outcome.clone());
                if self.session.apply_status(ticket, outcome) {
                    Update::Status(status)
                } else {
                    self.discard(Workflow::Status, ticket)
                }
            }
            Event::Answered { ticket, result } => {
                let model = ResultShaper::shape(&result);
                if self.session.result.complete(ticket, result) {
                    Update::Result(model)
                } else {
                    self.discard(Workflow::Query, ticket)
                }
            }
            Event::History(Ok(entries)) => Update::History(entries),
            Event::History(Err(message)) => Update::Failed {
                workflow: Workflow::History,
                message,
            },
            Event::Health(Ok(payload)) => Update::Health(payload),
            Event::Health(Err(message)) => Update::Failed {
                workflow: Workflow::Health,
                message,
            },
        }
    }

    /// Dispatch an action and apply completions until nothing is outstanding.
    ///
    /// Used by one-shot commands; returns the last update.
    pub async fn perform(&mut self, action: Action) -> Update {
        let mut update = self.dispatch(action);
        while self.outstanding > 0 {
            match self.next_event().await {
                Some(event) => update = self.apply(event),
                None => break,
            }
        }
        update
    }

    fn spawn<F>(&mut self, call: F)
    where
        F: Future<Output = Event> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        self.outstanding += 1;
        tokio::spawn(async move {
            tx.send(call.await).ok();
        });
    }

    fn discard(&self, workflow: Workflow, ticket: Ticket) -> Update {
        tracing::debug!("Discarding superseded {:?} response #{}", workflow, ticket.seq());
        Update::Discarded(workflow)
    }
}
