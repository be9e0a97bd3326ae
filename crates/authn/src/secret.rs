//! The process-wide shared secret.
//!
//! # Security
//!
//! - The secret is held in a [`Zeroizing`] buffer and scrubbed on drop.
//! - `Debug` output is redacted.
//! - Comparison runs in constant time over the candidate's bytes via
//!   [`subtle::ConstantTimeEq`]. Only the length of the configured secret can
//!   be inferred from timing.

use std::fmt;

use serde::{Deserialize, Deserializer};
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::{AuthError, Result};

/// A single static secret that authorizes mutating operations.
///
/// Comparison is exact: no trimming, no case folding.
#[derive(Clone)]
pub struct SharedSecret {
    value: Zeroizing<String>,
}

impl SharedSecret {
    /// Wraps `value` as the shared secret.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmptySecret`] if `value` is empty. An empty secret
    /// would authorize any request that omits one.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = Zeroizing::new(value.into());
        if value.is_empty() {
            return Err(AuthError::EmptySecret);
        }
        Ok(Self { value })
    }

    /// Checks `candidate` against the secret.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] unless `candidate` is byte-for-byte
    /// equal to the secret.
    pub fn verify(&self, candidate: &str) -> Result<()> {
        if bool::from(self.value.as_bytes().ct_eq(candidate.as_bytes())) {
            Ok(())
        } else {
            debug!("shared secret mismatch");
            Err(AuthError::Unauthorized)
        }
    }

    /// Like [`verify`](Self::verify), treating an absent candidate as a
    /// mismatch.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] if `candidate` is `None` or wrong.
    pub fn verify_presented(&self, candidate: Option<&str>) -> Result<()> {
        match candidate {
            Some(candidate) => self.verify(candidate),
            None => {
                debug!("shared secret not presented");
                Err(AuthError::Unauthorized)
            },
        }
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret").field("value", &"[REDACTED]").finish()
    }
}

impl<'de> Deserialize<'de> for SharedSecret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Zeroizing::new(String::deserialize(deserializer)?);
        SharedSecret::new(value.as_str()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn secret() -> SharedSecret {
        SharedSecret::new("s3cret").expect("non-empty secret")
    }

    #[test]
    fn exact_match_is_authorized() {
        assert!(secret().verify("s3cret").is_ok());
    }

    #[rstest]
    #[case::wrong("guess")]
    #[case::empty("")]
    #[case::prefix("s3cre")]
    #[case::extension("s3cret!")]
    #[case::padded(" s3cret ")]
    #[case::different_case("S3CRET")]
    fn anything_else_is_unauthorized(#[case] candidate: &str) {
        assert!(matches!(secret().verify(candidate), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn absent_candidate_is_unauthorized() {
        assert!(matches!(secret().verify_presented(None), Err(AuthError::Unauthorized)));
        assert!(secret().verify_presented(Some("s3cret")).is_ok());
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(SharedSecret::new(""), Err(AuthError::EmptySecret)));
    }

    #[test]
    fn debug_is_redacted() {
        let rendered = format!("{:?}", secret());
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn deserializes_from_string() {
        let parsed: SharedSecret = serde_json::from_str("\"s3cret\"").expect("deserialize");
        assert!(parsed.verify("s3cret").is_ok());

        let err = serde_json::from_str::<SharedSecret>("\"\"").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn only_the_exact_secret_verifies(
                configured in "[ -~]{1,32}",
                candidate in "[ -~]{0,32}",
            ) {
                let secret = SharedSecret::new(configured.clone()).expect("non-empty");
                prop_assert_eq!(secret.verify(&candidate).is_ok(), candidate == configured);
            }
        }
    }
}
