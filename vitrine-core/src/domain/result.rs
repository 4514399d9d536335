//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// Every gateway call and view operation surfaces one of these instead of
/// swallowing the failure, so callers can branch on it.
#[derive(Error, Debug)]
pub enum Error {
    /// No session token is stored. Raised before any request is issued.
    #[error("Not authenticated: please log in first")]
    NotAuthenticated,

    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx response from the backend
    #[error("{}", api_message(*.status, .body.as_deref()))]
    Api { status: u16, body: Option<String> },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    /// The view that issued the request was torn down before the result arrived
    #[error("Request cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn api_message(status: u16, body: Option<&str>) -> String {
    match body {
        Some(body) => format!("Backend error (HTTP {}): {}", status, body),
        None => format!("Backend error (HTTP {})", status),
    }
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a backend error, dropping blank payloads
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let body = if body.trim().is_empty() { None } else { Some(body) };
        Self::Api { status, body }
    }

    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, Self::NotAuthenticated)
    }

    /// HTTP status, when the error came from the backend
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend's error payload, verbatim
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Api { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result envelope (for `--json` output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let mut failed = Self::fail(e.to_string());
                if let Some(status) = e.status() {
                    let mut context = HashMap::new();
                    context.insert("status".to_string(), serde_json::json!(status));
                    failed.context = Some(context);
                }
                failed
            }
        }
    }
}
