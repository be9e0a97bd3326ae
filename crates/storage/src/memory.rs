//! In-memory code store.
//!
//! [`MemoryCodeStore`] keeps the [`CodeSet`] behind a [`parking_lot::RwLock`]
//! and persists nothing. It exists for tests and local development, and as the
//! reference implementation of the [`CodeStore`] contract.
//!
//! # Example
//!
//! ```
//! use codeguard_storage::{CodeStore, MemoryCodeStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryCodeStore::new();
//!     store.insert("x1").await.unwrap();
//!     store.insert("X1").await.unwrap();
//!     assert_eq!(store.list().await.unwrap(), vec!["X1".to_owned()]);
//! }
//! ```

use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{
    backend::CodeStore,
    code::Code,
    error::StorageResult,
    health::{HealthMetadata, HealthProbe, HealthStatus},
    limits::CodeLimits,
    set::CodeSet,
};

/// Non-persistent [`CodeStore`].
///
/// Cheaply cloneable; all clones share the same set.
#[derive(Clone, Default)]
pub struct MemoryCodeStore {
    codes: Arc<RwLock<CodeSet>>,
    limits: CodeLimits,
}

impl MemoryCodeStore {
    /// Creates an empty store with default [`CodeLimits`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with custom limits.
    #[must_use]
    pub fn with_limits(limits: CodeLimits) -> Self {
        Self { codes: Arc::default(), limits }
    }

    /// Returns the configured limits.
    #[must_use]
    pub fn limits(&self) -> &CodeLimits {
        &self.limits
    }
}

#[async_trait]
impl CodeStore for MemoryCodeStore {
    #[tracing::instrument(skip(self), fields(backend = "memory"))]
    async fn contains(&self, code: &str) -> StorageResult<bool> {
        let code = Code::lookup(code)?;
        Ok(self.codes.read().contains(&code))
    }

    #[tracing::instrument(skip(self), fields(backend = "memory"))]
    async fn insert(&self, code: &str) -> StorageResult<()> {
        let code = Code::parse(code, &self.limits)?;
        self.codes.write().insert(code);
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(backend = "memory"))]
    async fn remove(&self, code: &str) -> StorageResult<()> {
        let code = Code::lookup(code)?;
        self.codes.write().remove(&code);
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(backend = "memory"))]
    async fn remove_all(&self) -> StorageResult<()> {
        self.codes.write().clear();
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(backend = "memory"))]
    async fn list(&self) -> StorageResult<Vec<String>> {
        Ok(self.codes.read().to_strings())
    }

    #[tracing::instrument(skip(self), fields(backend = "memory"))]
    async fn health_check(&self, _probe: HealthProbe) -> StorageResult<HealthStatus> {
        let start = Instant::now();
        // Acquiring the read lock proves no writer is wedged.
        let count = self.codes.read().len();
        let metadata = HealthMetadata::new(start.elapsed(), "memory")
            .with_detail("code_count", count.to_string());
        Ok(HealthStatus::healthy(metadata))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::StorageErrorKind;

    #[tokio::test]
    async fn basic_operations() {
        let store = MemoryCodeStore::new();

        store.insert("abc").await.unwrap();
        assert!(store.contains("ABC").await.unwrap());

        store.remove(" abc ").await.unwrap();
        assert!(!store.contains("abc").await.unwrap());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryCodeStore::new();
        let clone = store.clone();

        store.insert("shared").await.unwrap();
        assert!(clone.contains("shared").await.unwrap());
    }

    #[tokio::test]
    async fn limits_are_applied() {
        let store = MemoryCodeStore::with_limits(CodeLimits::new(3).unwrap());
        let err = store.insert("toolong").await.unwrap_err();
        assert_eq!(err.kind(), StorageErrorKind::InvalidInput);
        assert!(store.list().await.unwrap().is_empty());

        // Lookups are not limited.
        assert!(!store.contains("toolong").await.unwrap());
        store.remove("toolong").await.unwrap();
        assert_eq!(store.limits().max_code_len(), 3);
    }

    #[tokio::test]
    async fn health_reports_code_count() {
        let store = MemoryCodeStore::new();
        store.insert("a").await.unwrap();
        store.insert("b").await.unwrap();

        let status = store.health_check(HealthProbe::Readiness).await.unwrap();
        assert!(status.is_healthy());
        assert_eq!(status.metadata().details.get("code_count").map(String::as_str), Some("2"));
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            /// Any whitespace/case variant of an inserted code is found.
            #[test]
            fn insert_then_contains_variant(
                raw in "[a-z0-9]{1,12}",
                pad_left in "[ \\t]{0,3}",
                pad_right in "[ \\t]{0,3}",
            ) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("runtime");

                rt.block_on(async {
                    let store = MemoryCodeStore::new();
                    store.insert(&raw).await.unwrap();
                    let variant = format!("{pad_left}{}{pad_right}", raw.to_uppercase());
                    prop_assert!(store.contains(&variant).await.unwrap());
                    Ok(())
                })?;
            }
        }
    }
}
