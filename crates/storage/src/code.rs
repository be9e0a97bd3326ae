//! The normalized [`Code`] type.
//!
//! A code is compared after normalization: surrounding whitespace is trimmed
//! and every character is upper-cased. `" abc "` and `"ABC"` are the same code.
//! The empty string is never a code.

use std::{borrow::Borrow, fmt};

use serde::Serialize;

use crate::{
    error::{StorageError, StorageResult},
    limits::CodeLimits,
};

/// Normalizes a raw code: trim surrounding whitespace, then upper-case.
///
/// Normalization is idempotent: `normalize(&normalize(s)) == normalize(s)`.
///
/// ```
/// use codeguard_storage::normalize;
///
/// assert_eq!(normalize("  whxgpo\t"), "WHXGPO");
/// assert_eq!(normalize(&normalize(" x1 ")), normalize(" x1 "));
/// ```
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A validated, normalized validation code.
///
/// Construct one with [`Code::parse`] before admitting it to a store, or with
/// [`Code::lookup`] to search for one. Equality, hashing, and ordering all
/// operate on the normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Code(String);

impl Code {
    /// Normalizes `raw` and validates it against `limits`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidInput`] if the normalized code is empty,
    /// longer than [`CodeLimits::max_code_len`], or contains a control
    /// character (a newline would split the entry in the durable file).
    pub fn parse(raw: &str, limits: &CodeLimits) -> StorageResult<Self> {
        let Self(normalized) = Self::lookup(raw)?;
        if normalized.len() > limits.max_code_len() {
            return Err(StorageError::invalid_input(format!(
                "code is {} bytes, limit is {}",
                normalized.len(),
                limits.max_code_len()
            )));
        }
        if normalized.chars().any(char::is_control) {
            return Err(StorageError::invalid_input("code must not contain control characters"));
        }
        Ok(Self(normalized))
    }

    /// Normalizes `raw` into a key for `contains` and `remove`.
    ///
    /// Only emptiness is checked. A key that [`parse`](Self::parse) would
    /// reject simply matches nothing, and entries admitted under a larger
    /// limit stay reachable after the limit shrinks.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidInput`] if the normalized code is empty.
    pub fn lookup(raw: &str) -> StorageResult<Self> {
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return Err(StorageError::invalid_input("code must not be empty"));
        }
        Ok(Self(normalized))
    }

    /// Returns the normalized code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the code, returning the normalized string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Code {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Code {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::error::StorageErrorKind;

    #[rstest]
    #[case("abc", "ABC")]
    #[case("  abc  ", "ABC")]
    #[case("\tWhXgPo\n", "WHXGPO")]
    #[case("123abc", "123ABC")]
    #[case("a b", "A B")]
    fn parse_normalizes(#[case] raw: &str, #[case] expected: &str) {
        let code = Code::parse(raw, &CodeLimits::default()).unwrap();
        assert_eq!(code.as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t")]
    #[case("a\nb")]
    #[case("a\rb")]
    #[case("a\0b")]
    fn parse_rejects_invalid(#[case] raw: &str) {
        let err = Code::parse(raw, &CodeLimits::default()).unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::InvalidInput, "{raw:?} should be rejected");
    }

    #[test]
    fn parse_enforces_length_limit() {
        let limits = CodeLimits::new(4).unwrap();
        assert!(Code::parse("abcd", &limits).is_ok());
        // Trimmed whitespace does not count towards the limit.
        assert!(Code::parse("  abcd  ", &limits).is_ok());
        let err = Code::parse("abcde", &limits).unwrap_err();
        assert!(err.to_string().contains("limit is 4"), "unexpected message: {err}");
    }

    #[rstest]
    #[case("a\tb", "A\tB")]
    #[case("abcde", "ABCDE")]
    fn lookup_skips_shape_checks(#[case] raw: &str, #[case] expected: &str) {
        assert!(Code::parse(raw, &CodeLimits::new(4).unwrap()).is_err());
        assert_eq!(Code::lookup(raw).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case(" \t ")]
    fn lookup_rejects_empty(#[case] raw: &str) {
        assert_eq!(Code::lookup(raw).unwrap_err().kind(), StorageErrorKind::InvalidInput);
    }

    #[test]
    fn equivalent_variants_are_equal() {
        let limits = CodeLimits::default();
        assert_eq!(Code::parse(" abc ", &limits).unwrap(), Code::parse("ABC", &limits).unwrap());
    }

    #[test]
    fn serializes_as_plain_string() {
        let code = Code::parse("x1", &CodeLimits::default()).unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), r#""X1""#);
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn normalization_is_idempotent(raw in "[ \\t]{0,3}[a-zA-Z0-9éüß _-]{0,24}[ \\t]{0,3}") {
                let once = normalize(&raw);
                prop_assert_eq!(normalize(&once), once);
            }

            #[test]
            fn parsed_code_reparses_to_itself(raw in "[ ]{0,2}[a-z0-9]{1,16}[ ]{0,2}") {
                let limits = CodeLimits::default();
                let code = Code::parse(&raw, &limits).unwrap();
                prop_assert_eq!(Code::parse(code.as_str(), &limits).unwrap(), code);
            }
        }
    }
}
