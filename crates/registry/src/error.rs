//! Registry error types and their response mapping.

use codeguard_authn::AuthError;
use codeguard_storage::{StorageError, StorageErrorKind};
use serde::Serialize;
use thiserror::Error;

/// Errors returned by [`RegistryService`](crate::RegistryService).
///
/// Every variant maps to exactly one response status via
/// [`status_code`](RegistryError::status_code).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// The request is malformed, e.g. the code is missing or empty.
    #[error("{reason}")]
    InvalidInput {
        /// Human-readable explanation returned to the caller.
        reason: String,
    },

    /// The presented secret is missing or wrong.
    #[error("Unauthorized")]
    Unauthorized,

    /// The code store failed.
    #[error("Storage error: {0}")]
    Storage(#[source] StorageError),

    /// The service could not be configured.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what was wrong.
        message: String,
    },
}

/// Response body carried by every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Message shown to the caller.
    pub detail: String,
}

impl RegistryError {
    /// Creates an [`InvalidInput`](Self::InvalidInput) error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput { reason: reason.into() }
    }

    /// Creates a [`Config`](Self::Config) error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Response status for this error: 400, 403, or 500.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput { .. } => 400,
            Self::Unauthorized => 403,
            Self::Storage(_) | Self::Config { .. } => 500,
        }
    }

    /// Response body for this error.
    ///
    /// Server-side faults are reported generically; their detail goes to the
    /// log instead.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        let detail = match self {
            Self::InvalidInput { .. } | Self::Unauthorized => self.to_string(),
            Self::Storage(_) => "Storage unavailable".to_owned(),
            Self::Config { .. } => "Service misconfigured".to_owned(),
        };
        ErrorBody { detail }
    }
}

impl From<StorageError> for RegistryError {
    fn from(err: StorageError) -> Self {
        match err.kind() {
            StorageErrorKind::InvalidInput => Self::invalid_input(err.to_string()),
            _ => Self::Storage(err),
        }
    }
}

impl From<AuthError> for RegistryError {
    fn from(err: AuthError) -> Self {
        if err.is_unauthorized() { Self::Unauthorized } else { Self::config(err.to_string()) }
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
