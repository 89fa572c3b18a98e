//! In-memory transport with scripted responses, used by unit tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::oneshot;

use super::{Endpoint, FilePart, Transport};
use crate::{Error, Result};

/// A scripted reply for one call
pub enum Reply {
    Json(Value),
    /// Resolves when the test sends the value; lets tests order completions
    Gated(oneshot::Receiver<Value>),
    Fail(String),
}

/// A recorded request
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
    pub files: Vec<String>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, path: &str, reply: Reply) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(&self, call: Call) -> Result<Value> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&call.path)
            .and_then(VecDeque::pop_front);
        let path = call.path.clone();
        self.calls.lock().unwrap().push(call);

        match reply {
            Some(Reply::Json(value)) => Ok(value),
            Some(Reply::Gated(rx)) => rx.await.map_err(|_| refused("gate dropped")),
            Some(Reply::Fail(message)) => Err(refused(&message)),
            None => Err(refused(&format!("no reply scripted for {}", path))),
        }
    }
}

fn refused(message: &str) -> Error {
    Error::Io(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, message.to_string()))
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get_json(&self, endpoint: Endpoint<'_>) -> Result<Value> {
        self.answer(Call { method: "GET", path: endpoint.path(), body: None, files: Vec::new() })
            .await
    }

    async fn post_json(&self, endpoint: Endpoint<'_>, body: &Value) -> Result<Value> {
        self.answer(Call {
            method: "POST",
            path: endpoint.path(),
            body: Some(body.clone()),
            files: Vec::new(),
        })
        .await
    }

    async fn post_files(&self, endpoint: Endpoint<'_>, field: &str, files: Vec<FilePart>) -> Result<Value> {
        self.answer(Call {
            method: "POST",
            path: endpoint.path(),
            body: Some(Value::String(field.to_string())),
            files: files.into_iter().map(|f| f.file_name).collect(),
        })
        .await
    }
}
