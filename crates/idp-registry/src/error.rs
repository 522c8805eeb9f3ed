//! Registry error types.

use idp_storage::StorageError;
use thiserror::Error;

/// Errors that can occur while resolving providers.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No provider could be resolved for the requested id. Covers absent,
    /// malformed, and build-failed records uniformly - callers of the
    /// single-item API do not need to distinguish the cause.
    #[error("no such provider: {kind}:{provider_id}")]
    NotFound {
        /// Provider kind (the authority's id).
        kind: String,
        /// Requested provider id.
        provider_id: String,
    },

    /// The kind's builder rejected the configuration or failed during
    /// construction. Never cached; the next access retries the build.
    #[error("provider build failed for {provider_id}: {message}")]
    Build {
        /// The record that failed to build.
        provider_id: String,
        /// Builder-reported cause.
        message: String,
    },

    /// The record exists but its configuration does not decode into the
    /// shape the builder needs.
    #[error("invalid provider configuration for {provider_id}: {message}")]
    Configuration {
        /// The record with invalid configuration.
        provider_id: String,
        /// Decode or validation error.
        message: String,
    },

    /// The underlying configuration store failed. Never mapped to
    /// not-found, since that would cause incorrect auto-creation or
    /// incorrect "no provider" responses.
    #[error("configuration store error: {0}")]
    Store(#[from] StorageError),
}

impl RegistryError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(kind: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            provider_id: provider_id.into(),
        }
    }

    /// Creates a build failure error.
    #[must_use]
    pub fn build(provider_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Build {
            provider_id: provider_id.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid-configuration error.
    #[must_use]
    pub fn configuration(provider_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            provider_id: provider_id.into(),
            message: message.into(),
        }
    }

    /// Checks if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Checks if this error originated in the store backend rather than in
    /// one record's configuration or build.
    #[must_use]
    pub const fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_backend_failure())
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
