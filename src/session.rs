//! Session state - the single container the orchestrator writes to
//!
//! Each shared value lives in a [`Slot`]. Starting a request on a slot issues a
//! [`Ticket`] carrying the slot's next sequence number; a completion is only
//! accepted when its ticket is the latest one issued, so the last request
//! started wins regardless of the order responses arrive in.

use crate::model::{ConnectOutcome, JobId, QueryResult, StatusOutcome, UploadOutcome};
use crate::shape::{RenderModel, ResultShaper};
use serde::Serialize;

/// Sequence number of one outstanding request on a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// A value written by at most one request at a time
#[derive(Debug)]
pub struct Slot<T> {
    issued: u64,
    in_flight: bool,
    value: Option<T>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            issued: 0,
            in_flight: false,
            value: None,
        }
    }
}

impl<T> Slot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new request. Any older outstanding ticket is stale from now on.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.in_flight = true;
        Ticket(self.issued)
    }

    /// Store the value if the ticket is the latest issued. Returns whether it was applied.
    pub fn complete(&mut self, ticket: Ticket, value: T) -> bool {
        if ticket.0 != self.issued {
            return false;
        }
        self.in_flight = false;
        self.value = Some(value);
        true
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    /// Replace the value and invalidate every outstanding ticket
    pub fn reset(&mut self, value: T) {
        self.issued += 1;
        self.in_flight = false;
        self.value = Some(value);
    }
}

/// What the status line of the ingestion panel shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IngestStatus {
    /// Plain message, e.g. right after an upload
    Message(String),
    Polled(StatusOutcome),
}

impl IngestStatus {
    pub fn text(&self) -> String {
        match self {
            IngestStatus::Message(message) => message.clone(),
            IngestStatus::Polled(outcome) => outcome.message(),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            IngestStatus::Message(_) => false,
            IngestStatus::Polled(outcome) => outcome.is_active(),
        }
    }
}

/// Application state for one client session. Nothing here outlives the process.
#[derive(Debug, Default)]
pub struct Session {
    pub connection: Slot<ConnectOutcome>,
    pub upload: Slot<UploadOutcome>,
    pub job: Option<JobId>,
    pub status: Slot<IngestStatus>,
    pub result: Slot<QueryResult>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an upload outcome. An accepted upload replaces the current job
    /// (clearing it when no id came back) and resets its status; a failed one
    /// leaves the job alone.
    pub fn apply_upload(&mut self, ticket: Ticket, outcome: UploadOutcome) -> bool {
        let accepted = matches!(outcome, UploadOutcome::Created { .. } | UploadOutcome::NoJob);
        let job = outcome.job().cloned();
        let message = outcome.message();
        if !self.upload.complete(ticket, outcome) {
            return false;
        }
        if accepted {
            self.job = job;
            self.status.reset(IngestStatus::Message(message));
        } else {
            self.status.set(IngestStatus::Message(message));
        }
        true
    }

    /// Record a status poll, dropping it when it belongs to a job that is no longer current
    pub fn apply_status(&mut self, ticket: Ticket, outcome: StatusOutcome) -> bool {
        if self.job.as_ref() != Some(outcome.job()) {
            return false;
        }
        self.status.complete(ticket, IngestStatus::Polled(outcome))
    }

    /// Render model of the current result, if any
    pub fn render_model(&self) -> Option<RenderModel> {
        self.result.get().map(ResultShaper::shape)
    }
}
