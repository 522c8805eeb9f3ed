//! Auto-creating store decorator.
//!
//! Many provider kinds have exactly one meaningful instance per realm (e.g.
//! the template provider for a tenant). Rather than requiring an explicit
//! provisioning step, this wrapper materializes a default record on first
//! lookup miss and persists it through the underlying store, so callers
//! never special-case "not yet configured" and the record is durable after
//! the first call.

use async_trait::async_trait;
use idp_model::ProviderConfig;

use crate::error::StorageResult;
use crate::store::{require_key, ConfigStore};

/// Synthesizes a default record for a provider id that missed in the
/// underlying store, or declines with `None`.
pub type ProviderCreator = Box<dyn Fn(&str) -> Option<ProviderConfig> + Send + Sync>;

/// Synthesizes exactly one default record for a realm with no records, or
/// declines with `None`.
pub type RealmFactory = Box<dyn Fn(&str) -> Option<ProviderConfig> + Send + Sync>;

/// [`ConfigStore`] decorator with pluggable lazy provisioning.
///
/// `find_by_provider_id` and `find_by_realm` consult the optional
/// [`ProviderCreator`] / [`RealmFactory`] on a miss; every other operation
/// passes through unchanged. Creation is idempotent from the caller's view:
/// the synthesized record is persisted via `add_registration`, so a
/// concurrent duplicate creation collapses into an upsert of the same key.
pub struct AutoCreateStore<S> {
    inner: S,
    creator: Option<ProviderCreator>,
    factory: Option<RealmFactory>,
}

impl<S: ConfigStore> AutoCreateStore<S> {
    /// Wraps a store with no creation functions (pure pass-through).
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            creator: None,
            factory: None,
        }
    }

    /// Sets the per-provider-id creator.
    #[must_use]
    pub fn with_creator(
        mut self,
        creator: impl Fn(&str) -> Option<ProviderConfig> + Send + Sync + 'static,
    ) -> Self {
        self.creator = Some(Box::new(creator));
        self
    }

    /// Sets the per-realm factory.
    #[must_use]
    pub fn with_factory(
        mut self,
        factory: impl Fn(&str) -> Option<ProviderConfig> + Send + Sync + 'static,
    ) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: ConfigStore> ConfigStore for AutoCreateStore<S> {
    fn kind(&self) -> &str {
        self.inner.kind()
    }

    async fn find_by_provider_id(
        &self,
        provider_id: &str,
    ) -> StorageResult<Option<ProviderConfig>> {
        require_key(provider_id, "provider id")?;
        if let Some(record) = self.inner.find_by_provider_id(provider_id).await? {
            return Ok(Some(record));
        }

        let Some(created) = self.creator.as_ref().and_then(|c| c(provider_id)) else {
            return Ok(None);
        };
        tracing::debug!(
            kind = %self.inner.kind(),
            provider_id = %provider_id,
            "auto-creating default configuration record"
        );
        let persisted = self.inner.add_registration(&created).await?;
        Ok(Some(persisted))
    }

    async fn find_all(&self) -> StorageResult<Vec<ProviderConfig>> {
        self.inner.find_all().await
    }

    async fn find_by_realm(&self, realm: &str) -> StorageResult<Vec<ProviderConfig>> {
        require_key(realm, "realm")?;
        let records = self.inner.find_by_realm(realm).await?;
        if !records.is_empty() {
            return Ok(records);
        }

        let Some(created) = self.factory.as_ref().and_then(|f| f(realm)) else {
            return Ok(records);
        };
        tracing::debug!(
            kind = %self.inner.kind(),
            realm = %realm,
            "auto-creating default configuration record for realm"
        );
        let persisted = self.inner.add_registration(&created).await?;
        Ok(vec![persisted])
    }

    async fn add_registration(&self, record: &ProviderConfig) -> StorageResult<ProviderConfig> {
        self.inner.add_registration(record).await
    }

    async fn remove_registration(&self, provider_id: &str) -> StorageResult<()> {
        self.inner.remove_registration(provider_id).await
    }
}
