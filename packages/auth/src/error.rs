// ABOUTME: Error types for the Slack OAuth session lifecycle
// ABOUTME: Separates transport failures, provider rejections, and malformed responses per operation

use std::fmt;

use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Provider operation an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CodeExchange,
    Refresh,
    Revoke,
    ProfileFetch,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CodeExchange => write!(f, "Authorization code exchange"),
            Self::Refresh => write!(f, "Token refresh"),
            Self::Revoke => write!(f, "Token revocation"),
            Self::ProfileFetch => write!(f, "Profile fetch"),
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{operation} failed: {message}")]
    Transport { operation: Operation, message: String },

    #[error("{operation} rejected by provider: {code}")]
    ProviderRejected { operation: Operation, code: String },

    #[error("{operation} response is missing {field}")]
    MalformedResponse {
        operation: Operation,
        field: &'static str,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthError {
    pub fn transport(operation: Operation, err: impl fmt::Display) -> Self {
        Self::Transport {
            operation,
            message: err.to_string(),
        }
    }

    /// Operation this error belongs to, if it came from a provider call
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Transport { operation, .. }
            | Self::ProviderRejected { operation, .. }
            | Self::MalformedResponse { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// Provider error code for `ok: false` responses
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            Self::ProviderRejected { code, .. } => Some(code),
            _ => None,
        }
    }
}
