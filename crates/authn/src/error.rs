//! Authorization error types.

use thiserror::Error;

/// Authorization and secret-configuration errors.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]`; downstream match expressions must
/// include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// The presented secret is absent or does not match.
    ///
    /// Deliberately carries no detail so responses cannot leak how close a
    /// guess was.
    #[error("Unauthorized")]
    Unauthorized,

    /// The configured secret is empty.
    #[error("Shared secret must not be empty")]
    EmptySecret,
}

impl AuthError {
    /// Returns `true` for errors caused by the caller rather than by
    /// deployment configuration.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AuthError::Unauthorized)
    }
}

/// Result type alias for authorization operations.
pub type Result<T> = std::result::Result<T, AuthError>;
