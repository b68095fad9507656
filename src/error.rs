//! Error types for gateway calls and synchronization.
//!
//! None of these escape the synchronization controller: they are logged and
//! folded into the owning store's error string for the view to display.

use thiserror::Error;

/// Fallback message when the gateway answered with an error but no message.
pub const API_FAILED_MESSAGE: &str = "API call failed";

/// Fallback message when the gateway could not be reached at all.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error";

/// Failure reported by a [`Gateway`](crate::Gateway) call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The request never produced a response (connection refused, timeout, DNS).
    #[error("transport failure: {0}")]
    Transport(String),
    /// The gateway answered with a non-success status.
    #[error("gateway returned {status}: {}", .message.as_deref().unwrap_or(API_FAILED_MESSAGE))]
    Api { status: u16, message: Option<String> },
    /// The bearer credential was missing, expired or rejected.
    #[error("unauthorized: {}", .0.as_deref().unwrap_or("invalid credentials"))]
    Unauthorized(Option<String>),
    /// The target record does not exist on the gateway.
    #[error("not found: {0}")]
    NotFound(String),
    /// The response body did not match the expected shape.
    #[error("decode failed: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Transport(_) => 503,
            GatewayError::Api { status, .. } => *status,
            GatewayError::Unauthorized(_) => 401,
            GatewayError::NotFound(_) => 404,
            GatewayError::Decode(_) => 502,
        }
    }

    /// The message a user should see for this failure.
    ///
    /// Prefers whatever the gateway said, otherwise one of the generic
    /// fallbacks.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Transport(msg) if !msg.is_empty() => msg.clone(),
            GatewayError::Transport(_) => NETWORK_ERROR_MESSAGE.to_string(),
            GatewayError::Api { message, .. } | GatewayError::Unauthorized(message) => message
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| API_FAILED_MESSAGE.to_string()),
            GatewayError::NotFound(msg) | GatewayError::Decode(msg) if !msg.is_empty() => {
                msg.clone()
            }
            GatewayError::NotFound(_) | GatewayError::Decode(_) => API_FAILED_MESSAGE.to_string(),
        }
    }

    /// Whether this failure means the caller must sign in again.
    pub fn requires_login(&self) -> bool {
        matches!(self, GatewayError::Unauthorized(_))
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

/// A shallow merge produced a record that no longer fits the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("merge into {collection}:{id} failed: {message}")]
pub struct MergeError {
    pub collection: &'static str,
    pub id: String,
    pub message: String,
}

/// Failure of a synchronization intent, before it is folded into store state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// No bearer credential is available; the caller must sign in.
    #[error("authentication required")]
    Unauthenticated,
    /// The signed-in user's role does not allow this operation.
    #[error("{0}")]
    Forbidden(String),
    /// The payload was rejected before reaching the gateway.
    #[error("invalid {field}: {message}")]
    Invalid { field: &'static str, message: String },
    #[error(transparent)]
    Merge(#[from] MergeError),
}

impl SyncError {
    /// The message recorded in the store's error field.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Gateway(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}
