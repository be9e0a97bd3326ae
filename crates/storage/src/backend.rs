//! Code store trait definition.
//!
//! [`CodeStore`] is the single entry point to the registered codes. Callers
//! never read or write the durable file themselves; they hold a store
//! instance (usually behind an [`Arc`](std::sync::Arc)) and go through it.
//!
//! # Contract
//!
//! - Every operation normalizes its input first and fails with
//!   [`StorageError::InvalidInput`](crate::StorageError::InvalidInput) if the
//!   normalized code is empty.
//! - Mutations are serialized with respect to each other and to readers. A
//!   reader never observes a half-applied mutation.
//! - A mutation returns only after its effect is durable (for persistent
//!   backends).
//! - Storage faults surface as
//!   [`StorageError::StorageUnavailable`](crate::StorageError::StorageUnavailable);
//!   backends never retry internally.
//!
//! See [`MemoryCodeStore`](crate::MemoryCodeStore) and
//! [`FileCodeStore`](crate::FileCodeStore) for the two implementations, and the
//! `conformance` module (behind the `testutil` feature) for the executable
//! version of this contract.

use async_trait::async_trait;

use crate::{
    error::StorageResult,
    health::{HealthProbe, HealthStatus},
};

/// Concurrency-safe set of normalized validation codes.
///
/// # Operations
///
/// | Method | Description |
/// |--------|-------------|
/// | [`contains`](CodeStore::contains) | Membership check |
/// | [`insert`](CodeStore::insert) | Idempotent add |
/// | [`remove`](CodeStore::remove) | Remove every matching entry |
/// | [`remove_all`](CodeStore::remove_all) | Clear the set |
/// | [`list`](CodeStore::list) | Snapshot in persisted order |
/// | [`health_check`](CodeStore::health_check) | Probe backend availability |
///
/// # Example
///
/// ```
/// use codeguard_storage::{CodeStore, MemoryCodeStore};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let store = MemoryCodeStore::new();
///
/// store.insert("abc").await.unwrap();
/// assert!(store.contains(" ABC ").await.unwrap());
/// assert_eq!(store.list().await.unwrap(), vec!["ABC".to_owned()]);
/// # });
/// ```
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Returns `true` if the normalized `code` is registered.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn contains(&self, code: &str) -> StorageResult<bool>;

    /// Registers `code`.
    ///
    /// Inserting a code that is already present succeeds without writing a
    /// duplicate entry.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn insert(&self, code: &str) -> StorageResult<()>;

    /// Unregisters `code`.
    ///
    /// Every entry equal to the normalized code is removed. Removing an absent
    /// code is a no-op.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn remove(&self, code: &str) -> StorageResult<()>;

    /// Unregisters every code.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn remove_all(&self) -> StorageResult<()>;

    /// Returns a snapshot of all codes in persisted order.
    ///
    /// Each call produces a fresh snapshot; later mutations do not affect a
    /// snapshot already returned.
    #[must_use = "storage operations may fail and errors must be handled"]
    async fn list(&self) -> StorageResult<Vec<String>>;

    /// Checks backend health for the given probe.
    ///
    /// Returns `Ok(HealthStatus::Unhealthy(..))` when the probe ran and found
    /// a problem; `Err` is reserved for the check itself failing.
    #[must_use = "health check results indicate backend availability and must be inspected"]
    async fn health_check(&self, probe: HealthProbe) -> StorageResult<HealthStatus>;
}
