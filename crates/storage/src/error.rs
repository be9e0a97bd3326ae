//! Storage error types and result alias.
//!
//! Every [`CodeStore`](crate::CodeStore) backend maps its internal failures to
//! these variants so callers can tell a bad request apart from a storage fault.
//!
//! # Error Types
//!
//! - [`StorageError::InvalidInput`] - The code is empty after normalization or violates
//!   [`CodeLimits`](crate::CodeLimits)
//! - [`StorageError::StorageUnavailable`] - The durable medium is missing, unreadable, or
//!   unwritable
//! - [`StorageError::Corrupted`] - The durable file exists but cannot be decoded
//!
//! # Example
//!
//! ```
//! use codeguard_storage::{StorageError, StorageErrorKind, StorageResult};
//!
//! fn check(code: &str) -> StorageResult<()> {
//!     Err(StorageError::invalid_input("code must not be empty"))
//! }
//!
//! assert_eq!(check("").unwrap_err().kind(), StorageErrorKind::InvalidInput);
//! ```

use std::{fmt, sync::Arc};

use thiserror::Error;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for code store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during code store operations.
///
/// Errors preserve their source chain via the `#[source]` attribute.
///
/// # Non-exhaustive
///
/// New variants may be added in future minor releases. Downstream match
/// expressions must include a wildcard arm (`_ =>`), or match on
/// [`StorageError::kind`] instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// The supplied code is not acceptable.
    ///
    /// This is the only caller-caused store error. It is never retried.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Why the code was rejected.
        reason: String,
    },

    /// The durable medium could not be used.
    ///
    /// Raised when the backing file is missing, unreadable, or unwritable, or
    /// when the store could not be initialized. The store does not retry or
    /// recreate anything; retry policy belongs to the caller.
    #[error("Storage unavailable: {message}")]
    StorageUnavailable {
        /// Description of the failure, usually naming the path involved.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<BoxError>,
    },

    /// The durable file exists but its contents cannot be decoded.
    #[error("Storage corrupted: {message}")]
    Corrupted {
        /// Description of the decoding failure.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<BoxError>,
    },
}

/// Coarse classification of a [`StorageError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageErrorKind {
    /// Caller supplied an unusable code.
    InvalidInput,
    /// The storage layer faulted.
    StorageUnavailable,
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "invalid_input"),
            Self::StorageUnavailable => write!(f, "storage_unavailable"),
        }
    }
}

impl StorageError {
    /// Creates a new `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput { reason: reason.into() }
    }

    /// Creates a new `StorageUnavailable` error with the given message.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable { message: message.into(), source: None }
    }

    /// Creates a new `StorageUnavailable` error with a message and source error.
    #[must_use]
    pub fn unavailable_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::StorageUnavailable { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Corrupted` error with a message and source error.
    #[must_use]
    pub fn corrupted_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Corrupted { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Returns the coarse kind of this error.
    ///
    /// A corrupted file is a storage-layer fault, so it classifies as
    /// [`StorageErrorKind::StorageUnavailable`].
    #[must_use]
    pub fn kind(&self) -> StorageErrorKind {
        match self {
            Self::InvalidInput { .. } => StorageErrorKind::InvalidInput,
            Self::StorageUnavailable { .. } | Self::Corrupted { .. } => {
                StorageErrorKind::StorageUnavailable
            },
        }
    }

    /// Returns `true` if the caller caused this error.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        self.kind() == StorageErrorKind::InvalidInput
    }
}

/// Errors raised while validating store configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A numeric field is below its minimum.
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        /// Name of the offending field.
        field: &'static str,
        /// Smallest accepted value.
        min: String,
        /// Value that was supplied.
        value: String,
    },

    /// A field holds an unusable value.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
