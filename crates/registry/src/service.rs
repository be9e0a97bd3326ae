//! The request-facing façade.
//!
//! [`RegistryService`] owns a shared handle to a [`CodeStore`] and the
//! process-wide [`SharedSecret`]. It checks request shape and authorization,
//! delegates to the store, and wraps the result in a response body. It holds
//! no state of its own.

use std::sync::Arc;

use codeguard_authn::SharedSecret;
use codeguard_storage::{CodeStore, FileCodeStore, HealthProbe, HealthStatus, StorageError};
use tracing::{error, info};

use crate::{
    config::RegistryConfig,
    error::{RegistryError, Result},
    response::{
        ALL_CODES_REMOVED, CODE_ADDED, CODE_REMOVED, CodesResponse, MessageResponse,
        ValidityResponse,
    },
};

/// Detail returned when a request carries no code.
pub const CODE_REQUIRED: &str = "Code is required";

/// Validates, authorizes, and forwards code registry requests.
///
/// Mutating operations check the secret before anything else, so an
/// unauthorized caller learns nothing about its input.
pub struct RegistryService<S> {
    store: Arc<S>,
    secret: SharedSecret,
}

impl<S> Clone for RegistryService<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), secret: self.secret.clone() }
    }
}

impl RegistryService<FileCodeStore> {
    /// Opens the configured file store and wraps it in a service.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Storage`] if the store cannot be opened.
    pub async fn open(config: RegistryConfig) -> Result<Self> {
        let store = FileCodeStore::open(config.store).await.map_err(storage_error)?;
        Ok(Self::new(Arc::new(store), config.shared_secret))
    }
}

impl<S: CodeStore> RegistryService<S> {
    /// Creates a service over `store`, gated by `secret`.
    pub fn new(store: Arc<S>, secret: SharedSecret) -> Self {
        Self { store, secret }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Reports whether `code` is registered. Requires no secret.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidInput`] if `code` is missing or empty.
    /// - [`RegistryError::Storage`] if the store fails.
    #[tracing::instrument(skip(self))]
    pub async fn check(&self, code: Option<&str>) -> Result<ValidityResponse> {
        let code = required(code)?;
        let valid = self.store.contains(code).await.map_err(storage_error)?;
        Ok(ValidityResponse { valid })
    }

    /// Registers `code`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Unauthorized`] if `secret` is missing or wrong.
    /// - [`RegistryError::InvalidInput`] if `code` is missing or empty.
    /// - [`RegistryError::Storage`] if the store fails.
    #[tracing::instrument(skip(self, secret))]
    pub async fn add(&self, code: Option<&str>, secret: Option<&str>) -> Result<MessageResponse> {
        self.secret.verify_presented(secret)?;
        let code = required(code)?;
        self.store.insert(code).await.map_err(storage_error)?;
        info!("code added");
        Ok(MessageResponse::new(CODE_ADDED))
    }

    /// Unregisters `code`. Succeeds whether or not it was registered.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Unauthorized`] if `secret` is missing or wrong.
    /// - [`RegistryError::InvalidInput`] if `code` is missing or empty.
    /// - [`RegistryError::Storage`] if the store fails.
    #[tracing::instrument(skip(self, secret))]
    pub async fn remove(
        &self,
        code: Option<&str>,
        secret: Option<&str>,
    ) -> Result<MessageResponse> {
        self.secret.verify_presented(secret)?;
        let code = required(code)?;
        self.store.remove(code).await.map_err(storage_error)?;
        info!("code removed");
        Ok(MessageResponse::new(CODE_REMOVED))
    }

    /// Unregisters every code.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Unauthorized`] if `secret` is missing or wrong.
    /// - [`RegistryError::Storage`] if the store fails.
    #[tracing::instrument(skip(self, secret))]
    pub async fn remove_all(&self, secret: Option<&str>) -> Result<MessageResponse> {
        self.secret.verify_presented(secret)?;
        self.store.remove_all().await.map_err(storage_error)?;
        info!("all codes removed");
        Ok(MessageResponse::new(ALL_CODES_REMOVED))
    }

    /// Lists every registered code. Requires no secret.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Storage`] if the store fails.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<CodesResponse> {
        let codes = self.store.list().await.map_err(storage_error)?;
        Ok(CodesResponse { codes })
    }

    /// Probes the underlying store.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Storage`] if the probe itself cannot run.
    #[tracing::instrument(skip(self))]
    pub async fn health_check(&self, probe: HealthProbe) -> Result<HealthStatus> {
        self.store.health_check(probe).await.map_err(storage_error)
    }
}

fn required(code: Option<&str>) -> Result<&str> {
    match code {
        Some(code) if !code.is_empty() => Ok(code),
        _ => Err(RegistryError::invalid_input(CODE_REQUIRED)),
    }
}

/// Converts a store error, logging faults.
fn storage_error(err: StorageError) -> RegistryError {
    let err = RegistryError::from(err);
    if let RegistryError::Storage(ref source) = err {
        error!(error = %source, kind = %source.kind(), "code store failure");
    }
    err
}
