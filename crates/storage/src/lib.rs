//! Durable store of normalized validation codes.
//!
//! This crate provides the [`CodeStore`] trait and its two backends. It is the
//! single source of truth for which codes are registered; the registry service
//! layer holds a store instance and never touches the durable file itself.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RegistryService                          │
//! │        (input validation, shared-secret gate)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   CodeStore trait                           │
//! │   (contains, insert, remove, remove_all, list)              │
//! ├──────────────────┬──────────────────────────────────────────┤
//! │ MemoryCodeStore  │            FileCodeStore                 │
//! │    (testing)     │   (LineCodec, append + atomic rewrite)   │
//! └──────────────────┴──────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use codeguard_storage::{CodeStore, FileCodeStore, FileStoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dir = tempfile::tempdir()?;
//!     let config = FileStoreConfig::builder().path(dir.path().join("codes.txt")).build()?;
//!     let store = FileCodeStore::open(config).await?;
//!
//!     store.insert("abc").await?;
//!     assert!(store.contains("ABC").await?);
//!
//!     store.remove_all().await?;
//!     assert!(store.list().await?.is_empty());
//!     Ok(())
//! }
//! ```
//!
//! # Available Backends
//!
//! | Backend | Use Case | Persistence |
//! |---------|----------|-------------|
//! | [`MemoryCodeStore`] | Testing, development | No |
//! | [`FileCodeStore`] | Production | Yes |
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the [`testutil`] helpers and the [`conformance`] suite.
//! - **`failpoints`**: Activates the `fail` points inside [`FileCodeStore`].

#![deny(unsafe_code)]

pub mod backend;
pub mod code;
pub mod codec;
pub mod config;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used, clippy::panic)]
pub mod conformance;
pub mod error;
pub mod file;
pub mod health;
pub mod limits;
pub mod memory;
pub mod set;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used)]
pub mod testutil;

// Re-export primary types at crate root for convenience
pub use backend::CodeStore;
pub use code::{Code, normalize};
pub use codec::{Decoded, LineCodec};
pub use config::FileStoreConfig;
pub use error::{BoxError, ConfigError, StorageError, StorageErrorKind, StorageResult};
pub use file::FileCodeStore;
pub use health::{HealthMetadata, HealthProbe, HealthStatus};
pub use limits::{CodeLimits, DEFAULT_MAX_CODE_LEN};
pub use memory::MemoryCodeStore;
pub use set::CodeSet;
