//! Configuration store trait.

use async_trait::async_trait;
use idp_model::ProviderConfig;

use crate::error::{StorageError, StorageResult};

/// Durable persistence for provider configuration records.
///
/// A store instance is bound to exactly one provider kind at construction
/// (optionally disambiguated by a discriminator when two code paths share a
/// kind), so queries never cross kinds. Implementations must be thread-safe
/// and may be shared by multiple provider authorities, including across
/// processes for durable backends.
///
/// The store owns the `version` field: `add_registration` assigns the
/// baseline on insert and increments on every replacing update, and callers
/// must never observe it decrease for a given provider id.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// The provider kind this store is bound to.
    fn kind(&self) -> &str;

    /// Looks up a record by provider id.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Serialization` if the record exists but its
    /// document is corrupt - distinct from `Ok(None)` for an absent record.
    async fn find_by_provider_id(&self, provider_id: &str)
        -> StorageResult<Option<ProviderConfig>>;

    /// Lists all records of this kind, across all realms.
    async fn find_all(&self) -> StorageResult<Vec<ProviderConfig>>;

    /// Lists all records of this kind owned by one realm.
    async fn find_by_realm(&self, realm: &str) -> StorageResult<Vec<ProviderConfig>>;

    /// Upserts a record keyed by `(kind, provider_id)`.
    ///
    /// On insert the persisted record carries the baseline version; on
    /// replace the existing version is incremented. The returned record is
    /// the persisted state, including its post-bump version.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::InvalidData` if the record's kind does not
    /// match the store's bound kind.
    async fn add_registration(&self, record: &ProviderConfig) -> StorageResult<ProviderConfig>;

    /// Deletes a record by provider id. Removing an absent record is a
    /// no-op, not an error.
    async fn remove_registration(&self, provider_id: &str) -> StorageResult<()>;

    /// Deletes the given record's registration. Convenience form of
    /// [`Self::remove_registration`] keyed by the record itself.
    async fn remove_record(&self, record: &ProviderConfig) -> StorageResult<()> {
        self.remove_registration(&record.provider_id).await
    }

    /// Checks whether a record exists for the provider id.
    async fn has_provider(&self, provider_id: &str) -> StorageResult<bool> {
        Ok(self.find_by_provider_id(provider_id).await?.is_some())
    }
}

/// Fails fast on an empty lookup key - the contract-violation analogue of a
/// null argument. Shared by all store implementations.
///
/// ## Errors
///
/// Returns `StorageError::InvalidData` when `value` is empty.
pub fn require_key(value: &str, what: &str) -> StorageResult<()> {
    if value.is_empty() {
        return Err(StorageError::InvalidData(format!(
            "{what} must not be empty"
        )));
    }
    Ok(())
}
