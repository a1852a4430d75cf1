//! Error types for the Biblio client

use serde_json::Value;
use thiserror::Error;

/// Fallback message when the server gives no usable `detail`
const GENERIC_REJECTION: &str = "Request failed";

/// Normalized client error type.
///
/// Every outcome of a request funnels into one of these variants; repositories
/// pass them through unchanged and only the view layer turns them into
/// user-visible text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The transport itself failed: the server was never reached or the
    /// connection dropped mid-response. Never carries a server message.
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP 401. The session has already been cleared by the time this is
    /// returned; callers must treat it as "force re-login", not as retryable.
    #[error("Authentication required")]
    Unauthenticated,

    /// Any other non-2xx status, with the server-supplied reason.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Client-side self-protection guard: an admin may not change their own
    /// role or delete their own account. Returned without a network call.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A 2xx body that could not be decoded into the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Client construction failed (bad base URL, TLS backend, ...). Never
    /// produced by a request.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Build a `Rejected` error from a parsed response body.
    pub fn rejected(status: u16, body: &Value) -> Self {
        ApiError::Rejected {
            status,
            message: detail_message(body),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    /// Client-side validation failures take the same `Rejected` shape the
    /// server would have produced for the same payload, so the view layer
    /// handles both identically.
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = Vec::new();
        for (field, errs) in errors.field_errors() {
            for err in errs {
                match &err.message {
                    Some(msg) => messages.push(msg.to_string()),
                    None => messages.push(format!("{} is invalid", field)),
                }
            }
        }
        messages.sort();
        ApiError::Rejected {
            status: 400,
            message: if messages.is_empty() {
                GENERIC_REJECTION.to_string()
            } else {
                messages.join(" | ")
            },
        }
    }
}

/// Result type alias for client operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Extract a human-readable message from a server error body.
///
/// The upstream API reports failures as `{"detail": ...}` where `detail` is
/// either a plain string or a list of structured validation errors carrying a
/// `msg` field. Both shapes must be handled here, never per call site.
pub fn detail_message(body: &Value) -> String {
    match body.get("detail") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(|item| {
                item.get("msg")
                    .or_else(|| item.get("error"))
                    .and_then(Value::as_str)
                    .map(str::to_owned)
                    .unwrap_or_else(|| item.to_string())
            })
            .collect::<Vec<_>>()
            .join(" | "),
        _ => GENERIC_REJECTION.to_string(),
    }
}
