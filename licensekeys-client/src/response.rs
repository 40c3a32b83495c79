//! Interprets raw transport payloads into structured API results.
//!
//! Parsing is strict: a payload that is not well-formed JSON, or that lacks
//! the `error` field, is treated as an application error, never as success.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A parsed licensing service reply (`{error, data?, message?}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Application-level error flag. Required on the wire.
    pub error: bool,
    /// Response fields merged into the record on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    /// Human-readable status message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    fn malformed(reason: String) -> Self {
        Self {
            error: true,
            data: None,
            message: Some(reason),
        }
    }
}

/// Outcome of interpreting a raw payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpreted {
    /// Well-formed reply with `error: false`.
    Success(ApiResponse),
    /// Error reply, or a payload that failed strict parsing.
    Failure(ApiResponse),
}

/// Parses a raw response body. Parse failures are never retried.
#[must_use]
pub fn interpret(raw: &str) -> Interpreted {
    match serde_json::from_str::<ApiResponse>(raw) {
        Ok(response) if response.error => Interpreted::Failure(response),
        Ok(response) => Interpreted::Success(response),
        Err(e) => {
            Interpreted::Failure(ApiResponse::malformed(format!("malformed response payload: {e}")))
        }
    }
}
