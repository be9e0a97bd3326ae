//! Health check types for code stores.
//!
//! [`CodeStore::health_check`](crate::CodeStore::health_check) returns a
//! [`HealthStatus`] so a host process can wire the store into liveness and
//! readiness probes without knowing which backend it runs.
//!
//! | `HealthProbe`  | `HealthStatus` | HTTP Status |
//! |----------------|----------------|-------------|
//! | `Liveness`     | `Healthy`      | 200 OK      |
//! | `Readiness`    | `Healthy`      | 200 OK      |
//! | `Readiness`    | `Unhealthy`    | 503         |

use std::{collections::BTreeMap, fmt, time::Duration};

/// The kind of health probe to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthProbe {
    /// The store is not deadlocked. Does not touch the durable medium.
    Liveness,
    /// The store can serve requests: the durable medium is present and readable.
    Readiness,
}

impl fmt::Display for HealthProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Liveness => write!(f, "liveness"),
            Self::Readiness => write!(f, "readiness"),
        }
    }
}

/// Health status returned by a store.
#[derive(Debug, Clone)]
pub enum HealthStatus {
    /// The store is fully operational.
    Healthy(HealthMetadata),
    /// The store cannot serve requests. The `String` describes why.
    Unhealthy(HealthMetadata, String),
}

impl HealthStatus {
    /// Creates a `Healthy` status.
    #[must_use = "creating a status has no side effects"]
    pub fn healthy(metadata: HealthMetadata) -> Self {
        Self::Healthy(metadata)
    }

    /// Creates an `Unhealthy` status with a reason.
    #[must_use = "creating a status has no side effects"]
    pub fn unhealthy(metadata: HealthMetadata, reason: impl Into<String>) -> Self {
        Self::Unhealthy(metadata, reason.into())
    }

    /// Returns `true` if the store is healthy.
    #[must_use = "health status predicates should be checked"]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy(_))
    }

    /// Returns the metadata associated with this status.
    #[must_use]
    pub fn metadata(&self) -> &HealthMetadata {
        match self {
            Self::Healthy(m) | Self::Unhealthy(m, _) => m,
        }
    }

    /// Returns the failure reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Healthy(_) => None,
            Self::Unhealthy(_, reason) => Some(reason),
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy(m) => write!(f, "healthy ({}ms)", m.check_duration.as_millis()),
            Self::Unhealthy(m, reason) => {
                write!(f, "unhealthy: {} ({}ms)", reason, m.check_duration.as_millis())
            },
        }
    }
}

/// Metadata about a health check result.
#[derive(Debug, Clone)]
pub struct HealthMetadata {
    /// How long the check took.
    pub check_duration: Duration,
    /// Backend identifier (`"memory"`, `"file"`).
    pub backend: String,
    /// Backend-specific details, such as `code_count` or `path`.
    pub details: BTreeMap<String, String>,
}

impl HealthMetadata {
    /// Creates metadata for the given check duration and backend name.
    #[must_use]
    pub fn new(check_duration: Duration, backend: impl Into<String>) -> Self {
        Self { check_duration, backend: backend.into(), details: BTreeMap::new() }
    }

    /// Adds a detail entry, returning `self` for chaining.
    #[must_use = "returns the modified metadata for chaining"]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}
