//! Code shape validation.
//!
//! Provides configurable limits that reject oversized codes before they
//! reach the durable file. Backends take a [`CodeLimits`] at construction time
//! and apply it through [`Code::parse`](crate::Code::parse) when a code is admitted.
//!
//! # Defaults
//!
//! | Limit | Default |
//! |-------|---------|
//! | `max_code_len` | 256 bytes |

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default maximum normalized code length in bytes.
pub const DEFAULT_MAX_CODE_LEN: usize = 256;

/// Configurable limits for codes.
///
/// # Example
///
/// ```
/// use codeguard_storage::CodeLimits;
///
/// let limits = CodeLimits::new(32).unwrap();
/// assert_eq!(limits.max_code_len(), 32);
/// assert!(CodeLimits::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCodeLimits", into = "RawCodeLimits")]
pub struct CodeLimits {
    max_code_len: usize,
}

impl CodeLimits {
    /// Creates limits with the given maximum code length.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BelowMinimum`] if `max_code_len` is zero.
    pub fn new(max_code_len: usize) -> Result<Self, ConfigError> {
        if max_code_len == 0 {
            return Err(ConfigError::BelowMinimum {
                field: "max_code_len",
                min: "1".into(),
                value: "0".into(),
            });
        }
        Ok(Self { max_code_len })
    }

    /// Returns the maximum normalized code length in bytes.
    #[must_use]
    pub fn max_code_len(&self) -> usize {
        self.max_code_len
    }

    /// Limits that accept any length, used when decoding entries that were
    /// already admitted under an earlier configuration.
    pub(crate) const fn unbounded() -> Self {
        Self { max_code_len: usize::MAX }
    }
}

impl Default for CodeLimits {
    fn default() -> Self {
        Self { max_code_len: DEFAULT_MAX_CODE_LEN }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCodeLimits {
    #[serde(default = "default_max_code_len")]
    max_code_len: usize,
}

fn default_max_code_len() -> usize {
    DEFAULT_MAX_CODE_LEN
}

impl TryFrom<RawCodeLimits> for CodeLimits {
    type Error = ConfigError;

    fn try_from(raw: RawCodeLimits) -> Result<Self, Self::Error> {
        Self::new(raw.max_code_len)
    }
}

impl From<CodeLimits> for RawCodeLimits {
    fn from(limits: CodeLimits) -> Self {
        Self { max_code_len: limits.max_code_len }
    }
}
