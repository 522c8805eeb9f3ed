//! Storage error types.

use thiserror::Error;

/// Errors that can occur during configuration store operations.
///
/// The taxonomy deliberately keeps "the record is corrupt"
/// ([`Serialization`](Self::Serialization)) distinct from "the record does
/// not exist" and from "the backend is unavailable"
/// ([`Connection`](Self::Connection)/[`Query`](Self::Query)): callers treat
/// each differently, and collapsing them would cause incorrect auto-creation
/// or incorrect "no provider" responses.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No record exists for the requested provider id.
    #[error("configuration not found: {kind}:{provider_id}")]
    NotFound {
        /// Provider kind (store partition).
        kind: String,
        /// Requested provider id.
        provider_id: String,
    },

    /// Caller passed an argument that violates the store contract.
    #[error("invalid argument: {0}")]
    InvalidData(String),

    /// A persisted document failed to encode or decode.
    #[error("configuration document error for {provider_id}: {message}")]
    Serialization {
        /// The record whose document is malformed.
        provider_id: String,
        /// Underlying codec error.
        message: String,
    },

    /// The persistence backend could not be reached.
    #[error("storage connection error: {0}")]
    Connection(String),

    /// The persistence backend rejected a query.
    #[error("storage query error: {0}")]
    Query(String),

    /// Internal storage error.
    #[error("internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(kind: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            provider_id: provider_id.into(),
        }
    }

    /// Creates a serialization error for a record's document.
    #[must_use]
    pub fn serialization(provider_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            provider_id: provider_id.into(),
            message: message.into(),
        }
    }

    /// Checks if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Checks if this is a malformed-document error.
    #[must_use]
    pub const fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Checks if this error means the backend itself failed, as opposed to
    /// a problem with one record or one argument.
    #[must_use]
    pub const fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Query(_) | Self::Internal(_)
        )
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
