//! Configuration for the file-backed code store.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{code::Code, error::ConfigError, limits::CodeLimits};

/// Configuration for [`FileCodeStore`](crate::FileCodeStore).
///
/// # Example
///
/// ```
/// use codeguard_storage::FileStoreConfig;
///
/// let config = FileStoreConfig::builder()
///     .path("/var/lib/codeguard/codes.txt")
///     .seed_codes(vec!["123ABC".into(), "456DEF".into(), "WHXGPO".into()])
///     .build()?;
/// assert!(config.lock());
/// # Ok::<(), codeguard_storage::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileStoreConfig {
    /// Path of the durable code file.
    pub(crate) path: PathBuf,

    /// Shape limits applied to incoming codes.
    #[serde(default)]
    pub(crate) limits: CodeLimits,

    /// Codes written when the file is first created. Ignored if the file
    /// already exists.
    #[serde(default)]
    pub(crate) seed_codes: Vec<String>,

    /// Hold an exclusive advisory lock on `<path>.lock` while the store is open.
    #[serde(default = "default_lock")]
    pub(crate) lock: bool,
}

fn default_lock() -> bool {
    true
}

#[bon::bon]
impl FileStoreConfig {
    /// Creates a new configuration, validating every field.
    ///
    /// # Optional Fields
    ///
    /// * `limits` - Code shape limits (default: [`CodeLimits::default`]).
    /// * `seed_codes` - Initial codes for a freshly created file (default: none).
    /// * `lock` - Take the cross-process lock (default: `true`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the path is empty or a seed code is
    /// not a valid code under `limits`.
    #[builder]
    pub fn new(
        #[builder(into)] path: PathBuf,
        #[builder(default)] limits: CodeLimits,
        #[builder(default)] seed_codes: Vec<String>,
        #[builder(default = default_lock())] lock: bool,
    ) -> Result<Self, ConfigError> {
        let config = Self { path, limits, seed_codes, lock };
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants that deserialization alone cannot enforce.
    ///
    /// # Errors
    ///
    /// See [`FileStoreConfig::new`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid { field: "path", reason: "must not be empty".into() });
        }
        for raw in &self.seed_codes {
            Code::parse(raw, &self.limits).map_err(|e| ConfigError::Invalid {
                field: "seed_codes",
                reason: format!("{raw:?}: {e}"),
            })?;
        }
        Ok(())
    }

    /// Returns the code file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the code limits.
    #[must_use]
    pub fn limits(&self) -> &CodeLimits {
        &self.limits
    }

    /// Returns the seed codes.
    #[must_use]
    pub fn seed_codes(&self) -> &[String] {
        &self.seed_codes
    }

    /// Returns whether the cross-process lock is taken.
    #[must_use]
    pub fn lock(&self) -> bool {
        self.lock
    }

    /// Returns the path of the advisory lock file.
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        sibling(&self.path, "lock")
    }

    /// Returns the path used for staging atomic rewrites.
    #[must_use]
    pub(crate) fn staging_path(&self) -> PathBuf {
        sibling(&self.path, "tmp")
    }
}

/// `codes.txt` + `lock` → `codes.txt.lock`, in the same directory so a rename
/// between them never crosses a filesystem.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}
