//! Error types for the coaching client.

/// Top-level error type for the client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Token store error: {0}")]
    Token(#[from] TokenError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors returned by the REST backend or the transport underneath it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Session token rejected or expired")]
    AuthExpired,

    #[error("No session token stored")]
    MissingToken,

    #[error("Resource not found: {path}")]
    NotFound { path: String },

    #[error("Request to {path} failed with status {status}: {message}")]
    Status {
        path: String,
        status: u16,
        message: String,
    },

    #[error("Transport error on {path}: {reason}")]
    Transport { path: String, reason: String },

    #[error("Invalid response from {path}: {reason}")]
    InvalidResponse { path: String, reason: String },
}

impl ApiError {
    /// Whether this error means the session is no longer valid.
    ///
    /// A missing token on an authenticated call is treated the same as a
    /// rejected one.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired | Self::MissingToken)
    }

    /// Human-readable message suitable for a notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthExpired | Self::MissingToken => {
                "Your session has expired. Please sign in again.".to_string()
            }
            Self::Status { message, .. } if !message.is_empty() => message.clone(),
            Self::Transport { .. } => {
                "Unable to reach the server. Check your connection and try again.".to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// Token persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while constructing a step sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("A flow needs at least one step")]
    Empty,

    #[error("Duplicate step id: {id}")]
    DuplicateStepId { id: String },
}

/// Diagnostic submission errors. Both variants are user-visible.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Diagnostic submission failed: {reason}")]
    Failed { reason: String },

    #[error("Session expired during submission")]
    AuthExpired,
}

impl SubmissionError {
    /// Whether the user may resubmit the same answers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
