//! # Codeguard Registry
//!
//! Request-facing façade over a [`CodeStore`](codeguard_storage::CodeStore).
//!
//! Routing, parameter extraction, and transport are left to the embedding
//! server. This crate turns already-extracted request fields into store calls
//! and maps every outcome to a response body and a status code:
//!
//! | Operation | Secret | Success body |
//! |-----------|--------|--------------|
//! | [`check`](RegistryService::check) | no | [`ValidityResponse`] |
//! | [`add`](RegistryService::add) | yes | [`MessageResponse`] |
//! | [`remove`](RegistryService::remove) | yes | [`MessageResponse`] |
//! | [`remove_all`](RegistryService::remove_all) | yes | [`MessageResponse`] |
//! | [`list`](RegistryService::list) | no | [`CodesResponse`] |
//!
//! Failures are [`RegistryError`]s; [`RegistryError::status_code`] yields 400,
//! 403, or 500 and [`RegistryError::to_body`] the `{"detail": ...}` body.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use codeguard_authn::SharedSecret;
//! use codeguard_registry::RegistryService;
//! use codeguard_storage::MemoryCodeStore;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = RegistryService::new(Arc::new(MemoryCodeStore::new()), SharedSecret::new("s3cret")?);
//!
//! service.add(Some("whxgpo"), Some("s3cret")).await?;
//! assert!(service.check(Some("WHXGPO")).await?.valid);
//!
//! let err = service.remove_all(Some("guess")).await.unwrap_err();
//! assert_eq!(err.status_code(), 403);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Configuration loading.
pub mod config;
/// Error types and response mapping.
pub mod error;
/// Success response bodies.
pub mod response;
/// The registry service.
pub mod service;

pub use config::RegistryConfig;
pub use error::{ErrorBody, RegistryError, Result};
pub use response::{CodesResponse, MessageResponse, ValidityResponse};
pub use service::{CODE_REQUIRED, RegistryService};
