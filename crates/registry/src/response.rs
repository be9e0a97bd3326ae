//! Success response bodies.
//!
//! Each type serializes to the JSON object callers receive:
//!
//! | Type | JSON |
//! |------|------|
//! | [`ValidityResponse`] | `{"valid": true}` |
//! | [`MessageResponse`] | `{"message": "Code added successfully"}` |
//! | [`CodesResponse`] | `{"codes": ["123ABC"]}` |

use serde::{Deserialize, Serialize};

/// Message returned by a successful add.
pub const CODE_ADDED: &str = "Code added successfully";
/// Message returned by a successful remove.
pub const CODE_REMOVED: &str = "Code removed successfully";
/// Message returned by a successful remove-all.
pub const ALL_CODES_REMOVED: &str = "All codes removed successfully";

/// Result of a membership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityResponse {
    /// Whether the code is registered.
    pub valid: bool,
}

/// Confirmation of a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

impl MessageResponse {
    /// Creates a response carrying `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Every registered code, in persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodesResponse {
    /// Normalized codes.
    pub codes: Vec<String>,
}
