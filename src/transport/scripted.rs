use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;

use super::{ApiRequest, ApiResponse, Transport};
use crate::error::ConnectorError;

enum Scripted {
    Respond(ApiResponse),
    Fail(String),
}

/// In-process transport that replays queued responses in order and keeps
/// every request it received.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status.
    pub fn respond(&self, status: u16, body: Value) -> &Self {
        self.responses
            .lock()
            .push_back(Scripted::Respond(ApiResponse::new(status, body)));
        self
    }

    /// Queue a 200 response.
    pub fn respond_ok(&self, body: Value) -> &Self {
        self.respond(200, body)
    }

    /// Queue a transport-level failure.
    pub fn fail(&self, message: impl Into<String>) -> &Self {
        self.responses
            .lock()
            .push_back(Scripted::Fail(message.into()));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Responses not consumed yet.
    pub fn remaining(&self) -> usize {
        self.responses.lock().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ConnectorError> {
        let next = self.responses.lock().pop_front();
        let label = format!("{} {}", request.method, request.path);
        self.requests.lock().push(request);
        match next {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(ConnectorError::Transport(message)),
            None => Err(ConnectorError::Transport(format!(
                "no scripted response left for {}",
                label
            ))),
        }
    }
}
