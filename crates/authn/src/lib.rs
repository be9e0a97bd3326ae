//! # Codeguard Authorization
//!
//! Shared-secret gate for mutating registry operations.
//!
//! A deployment configures exactly one secret. Callers present a candidate
//! with each mutating request; [`SharedSecret::verify`] compares it in
//! constant time and returns [`AuthError::Unauthorized`] on any mismatch.
//!
//! ## Example
//!
//! ```
//! use codeguard_authn::{AuthError, SharedSecret};
//!
//! let secret = SharedSecret::new("s3cret")?;
//! assert!(secret.verify("s3cret").is_ok());
//! assert!(matches!(secret.verify("guess"), Err(AuthError::Unauthorized)));
//! # Ok::<(), AuthError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Authorization error types.
pub mod error;
/// The process-wide shared secret.
pub mod secret;

pub use error::{AuthError, Result};
pub use secret::SharedSecret;
