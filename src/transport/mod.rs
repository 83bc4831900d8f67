//! HTTP transport abstraction.
//!
//! The connector talks to the engine through [`Transport`]: one JSON
//! request in, one status + JSON body out. Non-2xx statuses are returned,
//! not raised; mapping them to [`ConnectorError`] is the connector's job.

mod http;
mod scripted;

pub use http::HttpTransport;
pub use scripted::ScriptedTransport;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

use crate::error::ConnectorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Safe to resend after a transient failure.
    pub fn is_idempotent_read(&self) -> bool {
        matches!(self, Self::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Relative to the host, without a leading slash
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `(code, message)` from a structured `{"code", "message"}` body.
    pub fn error_parts(&self) -> Option<(String, String)> {
        let code = self.body.get("code")?.as_str()?;
        let message = self
            .body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Some((code.to_string(), message.to_string()))
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ConnectorError> {
        serde_json::from_value(self.body).map_err(ConnectorError::from)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ConnectorError>;

    async fn get(&self, path: &str) -> Result<ApiResponse, ConnectorError> {
        self.send(ApiRequest::get(path)).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<ApiResponse, ConnectorError> {
        self.send(ApiRequest::new(Method::Post, path).with_body(body))
            .await
    }

    async fn put(&self, path: &str, body: Value) -> Result<ApiResponse, ConnectorError> {
        self.send(ApiRequest::new(Method::Put, path).with_body(body))
            .await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<ApiResponse, ConnectorError> {
        self.send(ApiRequest::new(Method::Patch, path).with_body(body))
            .await
    }

    async fn delete(&self, path: &str) -> Result<ApiResponse, ConnectorError> {
        self.send(ApiRequest::new(Method::Delete, path)).await
    }
}
