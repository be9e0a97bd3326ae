//! Line-delimited durable format.
//!
//! The durable file holds one normalized code per line, each terminated by
//! `\n`. [`LineCodec`] is the only code that knows this layout; the file
//! backend calls it and nothing else touches raw bytes.
//!
//! # Decoding
//!
//! Decoding is tolerant of the damage a crash or a hand edit can leave behind
//! and reports it through [`Decoded`] so the caller can decide whether to
//! rewrite the file:
//!
//! | Input | Result |
//! |-------|--------|
//! | Final line without `\n` | Dropped (torn append) |
//! | Blank line | Skipped |
//! | Lower-case or padded entry | Normalized |
//! | Repeated entry | First occurrence kept |
//! | Non-UTF-8 bytes or control characters | [`StorageError::Corrupted`] |

use crate::{
    code::Code,
    error::{StorageError, StorageResult},
    limits::CodeLimits,
    set::CodeSet,
};

const TERMINATOR: u8 = b'\n';

/// Result of decoding a durable file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Codes in file order, deduplicated.
    pub codes: CodeSet,
    /// Length in bytes of an unterminated final line, if one was dropped.
    pub torn_tail: Option<usize>,
    /// Entries that were blank, non-normalized, or duplicated.
    pub non_canonical: usize,
}

impl Decoded {
    /// Returns `true` if re-encoding `codes` would not reproduce the input.
    #[must_use]
    pub fn needs_rewrite(&self) -> bool {
        self.torn_tail.is_some() || self.non_canonical > 0
    }
}

/// Serializer/parser pair for the line format.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

impl LineCodec {
    /// Encodes a single entry, terminator included, for appending.
    #[must_use]
    pub fn encode_entry(code: &Code) -> Vec<u8> {
        let mut buf = Vec::with_capacity(code.as_str().len() + 1);
        buf.extend_from_slice(code.as_str().as_bytes());
        buf.push(TERMINATOR);
        buf
    }

    /// Encodes a whole set in iteration order.
    #[must_use]
    pub fn encode(codes: &CodeSet) -> Vec<u8> {
        let mut buf = Vec::new();
        for code in codes {
            buf.extend_from_slice(code.as_str().as_bytes());
            buf.push(TERMINATOR);
        }
        buf
    }

    /// Decodes file contents.
    ///
    /// Entries are not checked against the configured length limit: anything
    /// already on disk was admitted earlier and must not be lost because the
    /// limit shrank.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corrupted`] if the bytes are not UTF-8 or an
    /// entry contains a control character.
    pub fn decode(bytes: &[u8]) -> StorageResult<Decoded> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| StorageError::corrupted_with_source("code file is not valid UTF-8", e))?;

        let (complete, torn_tail) = match text.rfind(TERMINATOR as char) {
            Some(idx) if idx + 1 == text.len() => (text, None),
            Some(idx) => (&text[..=idx], Some(text.len() - idx - 1)),
            None if text.is_empty() => (text, None),
            None => ("", Some(text.len())),
        };

        let limits = CodeLimits::unbounded();
        let mut decoded = Decoded { torn_tail, ..Decoded::default() };
        for (line_no, line) in complete.split_terminator(TERMINATOR as char).enumerate() {
            if line.trim().is_empty() {
                decoded.non_canonical += 1;
                continue;
            }
            let code = Code::parse(line, &limits).map_err(|e| StorageError::Corrupted {
                message: format!("line {} is not a valid code", line_no + 1),
                source: Some(std::sync::Arc::new(e)),
            })?;
            let canonical = code.as_str() == line;
            if !decoded.codes.insert(code) || !canonical {
                decoded.non_canonical += 1;
            }
        }
        Ok(decoded)
    }
}
