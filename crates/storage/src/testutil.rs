//! Shared test utilities for code store testing.
//!
//! Feature-gated behind `testutil` so it never leaks into production builds.
//!
//! ```toml
//! [dev-dependencies]
//! codeguard-storage = { path = "../storage", features = ["testutil"] }
//! ```
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use codeguard_storage::testutil::{TempFileStore, make_code};
//! ```

use std::{ops::Deref, path::PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::{
    CodeStore,
    config::FileStoreConfig,
    error::{StorageError, StorageErrorKind, StorageResult},
    file::FileCodeStore,
    health::{HealthProbe, HealthStatus},
    memory::MemoryCodeStore,
};

/// Create a deterministic test code from a prefix and index.
///
/// Produces codes like `"PREFIX-000042"` (zero-padded to 6 digits).
#[must_use]
pub fn make_code(prefix: &str, idx: usize) -> String {
    format!("{prefix}-{idx:06}").to_uppercase()
}

/// A [`FileCodeStore`] living in its own temporary directory.
///
/// The directory, code file, and lock file are removed when this is dropped.
pub struct TempFileStore {
    store: FileCodeStore,
    dir: TempDir,
}

impl TempFileStore {
    /// Opens a fresh, empty store in a new temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the directory or store cannot be created.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp directory");
        let config = FileStoreConfig::builder()
            .path(dir.path().join("codes.txt"))
            .build()
            .expect("valid config");
        let store = FileCodeStore::open(config).await.expect("failed to open file store");
        Self { store, dir }
    }

    /// Path of the backing code file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("codes.txt")
    }

    /// Reads the raw backing file.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be read.
    #[must_use]
    pub fn raw_contents(&self) -> String {
        std::fs::read_to_string(self.path()).expect("failed to read code file")
    }
}

impl Deref for TempFileStore {
    type Target = FileCodeStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

#[async_trait]
impl CodeStore for TempFileStore {
    async fn contains(&self, code: &str) -> StorageResult<bool> {
        self.store.contains(code).await
    }

    async fn insert(&self, code: &str) -> StorageResult<()> {
        self.store.insert(code).await
    }

    async fn remove(&self, code: &str) -> StorageResult<()> {
        self.store.remove(code).await
    }

    async fn remove_all(&self) -> StorageResult<()> {
        self.store.remove_all().await
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        self.store.list().await
    }

    async fn health_check(&self, probe: HealthProbe) -> StorageResult<HealthStatus> {
        self.store.health_check(probe).await
    }
}

/// Create a [`MemoryCodeStore`] pre-populated with `count` codes from
/// [`make_code`].
///
/// # Panics
///
/// Panics if any insert fails (should not happen with `MemoryCodeStore`).
pub async fn populated_memory_store(prefix: &str, count: usize) -> MemoryCodeStore {
    let store = MemoryCodeStore::new();
    for i in 0..count {
        store.insert(&make_code(prefix, i)).await.expect("populate insert failed");
    }
    store
}

/// Assert that a [`StorageResult`] failed with [`StorageErrorKind::InvalidInput`].
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use codeguard_storage::{assert_invalid_input, StorageError, StorageResult};
///
/// let result: StorageResult<()> = Err(StorageError::invalid_input("empty"));
/// assert_invalid_input!(result);
/// ```
#[macro_export]
macro_rules! assert_invalid_input {
    ($result:expr) => {
        assert!(
            $crate::testutil::is_invalid_input(&$result),
            "expected StorageError::InvalidInput, got: {:?}",
            $result,
        );
    };
}

/// Assert that a [`StorageResult`] failed with
/// [`StorageErrorKind::StorageUnavailable`].
#[macro_export]
macro_rules! assert_unavailable {
    ($result:expr) => {
        assert!(
            $crate::testutil::is_unavailable(&$result),
            "expected StorageError::StorageUnavailable, got: {:?}",
            $result,
        );
    };
}

/// Assert that a [`StorageResult`] is `Ok`, returning the inner value.
#[macro_export]
macro_rules! assert_storage_ok {
    ($result:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("expected Ok, got StorageError: {e:?}"),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("{}: expected Ok, got StorageError: {e:?}", $msg),
        }
    };
}

/// Returns `true` if `result` failed with invalid input.
pub fn is_invalid_input<T>(result: &StorageResult<T>) -> bool {
    matches!(result, Err(e) if e.kind() == StorageErrorKind::InvalidInput)
}

/// Returns `true` if `result` failed with a storage fault.
pub fn is_unavailable<T>(result: &StorageResult<T>) -> bool {
    matches!(result, Err(e) if e.kind() == StorageErrorKind::StorageUnavailable)
}

/// Returns `true` if `result` is specifically [`StorageError::Corrupted`].
pub fn is_corrupted<T>(result: &StorageResult<T>) -> bool {
    matches!(result, Err(StorageError::Corrupted { .. }))
}
