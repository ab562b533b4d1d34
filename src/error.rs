//! Error types shared by the API client and the services built on it.

use thiserror::Error;

/// Errors surfaced by calls against the StackSift API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The server rejected the request's credentials and no refresh was attempted
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The session could not be refreshed and has been cleared
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// Non-success status with the server's message (if any)
    #[error("Request failed ({status}): {message}")]
    Status { status: u16, message: String },

    /// The request never produced an HTTP response
    #[error("Network error: {0}")]
    Transport(String),

    /// Response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Client-side form validation failed before anything was sent
    #[error("{0}")]
    Validation(String),

    /// The signed-in user lacks the role an action requires
    #[error("{0}")]
    Forbidden(String),

    /// A local lookup (row, folder) had no match
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// The message a server attached to an error response, when there is one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } | ApiError::Unauthorized { message } => {
                Some(message.as_str())
            }
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. } | ApiError::SessionExpired)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
