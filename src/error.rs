//! Error taxonomy for the connector.
//!
//! Construction errors are raised synchronously by the query builder.
//! Domain errors are mapped from the engine's structured error bodies
//! (`{"code": ..., "message": ...}`) or from failed tasks.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

use crate::transport::ApiResponse;

#[derive(Error, Debug)]
pub enum ConnectorError {
    // ── construction ────────────────────────────────────────────────────
    #[error("Invalid where boolean '{0}', expected AND or OR")]
    InvalidWhereBoolean(String),
    #[error("Invalid ordering '{0}', expected asc or desc")]
    InvalidOrdering(String),
    #[error("Cannot order on a field after requesting random order")]
    CannotOrderAfterRandomOrder,
    #[error("orWhere is only supported inside a nested where group")]
    OrWhereTopLevelNotSupported,
    #[error("Cannot parse where clause: {0}")]
    CannotParseWhereClause(String),
    #[error("No index supplied for query")]
    IndexNotSupplied,
    #[error("No search engine host configured")]
    NoHostGiven,

    // ── remote domain errors ────────────────────────────────────────────
    #[error("Attribute `{0}` is not filterable")]
    CannotFilterOnAttribute(String),
    #[error("Attribute `{0}` is not sortable")]
    CannotSortByAttribute(String),
    #[error("Attribute `{0}` is not searchable")]
    CannotSearchOnAttribute(String),
    #[error("Index not found: {0}")]
    IndexNotFound(String),
    #[error("Index already exists: {0}")]
    IndexAlreadyExists(String),
    #[error("Missing document id: {0}")]
    MissingDocumentId(String),
    #[error("Incorrect API key: {0}")]
    IncorrectApiKey(String),
    #[error("Invalid parameter supplied: {0}")]
    InvalidParameter(String),
    #[error("API error (HTTP {status}, code {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    // ── sampling ────────────────────────────────────────────────────────
    #[error("Not enough documents to order randomly: only {found} found, {requested} requested")]
    NotEnoughDocumentsToOrderRandomly { found: u64, requested: usize },

    // ── tasks ───────────────────────────────────────────────────────────
    #[error("Task {uid} failed ({code}): {message}")]
    TaskFailed {
        uid: u64,
        code: String,
        message: String,
    },
    #[error("Task {uid} was canceled on the server")]
    TaskCanceled { uid: u64 },
    #[error("Task {uid} did not reach a terminal state within {waited:?} ({checks} status checks)")]
    TaskTimedOut {
        uid: u64,
        waited: Duration,
        checks: usize,
    },
    #[error("Polling for task {uid} was cancelled")]
    PollCancelled { uid: u64 },

    // ── plumbing ────────────────────────────────────────────────────────
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ConnectorError {
    /// Map a structured remote error code to a typed error.
    ///
    /// Returns `None` for codes without a dedicated variant so the caller
    /// can wrap them in its own generic error.
    pub fn from_known_code(code: &str, message: &str) -> Option<Self> {
        match code {
            "index_already_exists" => Some(Self::IndexAlreadyExists(message.to_string())),
            "index_not_found" => Some(Self::IndexNotFound(message.to_string())),
            "missing_document_id" => Some(Self::MissingDocumentId(message.to_string())),
            _ => None,
        }
    }

    /// Map an "Attribute `x` is not filterable|sortable|searchable" message.
    pub fn from_attribute_message(message: &str) -> Option<Self> {
        let captures = attribute_error_regex()?.captures(message)?;
        let attribute = captures.get(1)?.as_str().to_string();
        match captures.get(2)?.as_str() {
            "filterable" => Some(Self::CannotFilterOnAttribute(attribute)),
            "sortable" => Some(Self::CannotSortByAttribute(attribute)),
            "searchable" => Some(Self::CannotSearchOnAttribute(attribute)),
            _ => None,
        }
    }

    /// Map a non-2xx engine response.
    ///
    /// 401/403 mean a bad key; other 4xx bodies are checked for attribute
    /// and known error codes before falling back to [`ConnectorError::Api`].
    pub fn from_response(response: &ApiResponse) -> Self {
        let (code, message) = response.error_parts().unwrap_or_else(|| {
            let text = match &response.body {
                Value::String(text) => text.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            ("unknown".to_string(), text)
        });

        if response.status == 401 || response.status == 403 {
            return Self::IncorrectApiKey(message);
        }
        if (400..500).contains(&response.status) {
            if let Some(err) = Self::from_attribute_message(&message) {
                return err;
            }
        }
        Self::from_known_code(&code, &message).unwrap_or(Self::Api {
            status: response.status,
            code,
            message,
        })
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

fn attribute_error_regex() -> Option<&'static Regex> {
    static ATTRIBUTE_ERROR: OnceLock<Option<Regex>> = OnceLock::new();
    ATTRIBUTE_ERROR
        .get_or_init(|| Regex::new(r"Attribute `(.*?)` is not (filterable|sortable|searchable)").ok())
        .as_ref()
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ConnectorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
