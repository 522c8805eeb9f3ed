//! The per-kind provider authority.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use idp_model::ProviderConfig;
use idp_storage::{ConfigStore, StorageError};
use tokio::sync::OnceCell;

use crate::builder::ProviderBuilder;
use crate::cache::ProviderCache;
use crate::error::{RegistryError, RegistryResult};

/// Cache tuning for a provider authority.
#[derive(Debug, Clone)]
pub struct AuthorityConfig {
    /// Maximum number of cached provider instances; least-recently-used
    /// entries are evicted beyond this.
    pub capacity: usize,
    /// Time-to-live per cache entry, measured from insertion.
    pub ttl: Duration,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            ttl: Duration::from_secs(3600),
        }
    }
}

/// The outcome every caller racing on one build observes: the built
/// instance with the version it was built from, or the shared failure.
type BuildOutcome<P> = Result<(Arc<P>, i64), Arc<RegistryError>>;

/// Per-kind runtime that resolves provider ids to live provider instances.
///
/// The authority owns its in-process cache exclusively; the configuration
/// store may be shared with other authorities and other processes. Cache
/// consistency is pull-based: every resolution re-reads the record and
/// compares its version against the cached entry, so an update made
/// anywhere is picked up on the next access. Removing a record must be
/// paired by the caller with [`Self::invalidate`] on every authority
/// instance that might hold the id.
///
/// Concurrency contract: callers for different provider ids never block on
/// each other; callers racing on the same uncached id trigger exactly one
/// build and all observe its outcome.
pub struct ProviderAuthority<B: ProviderBuilder> {
    authority_id: String,
    store: Arc<dyn ConfigStore>,
    builder: B,
    cache: ProviderCache<B::Output>,
    in_flight: DashMap<String, Arc<OnceCell<BuildOutcome<B::Output>>>>,
}

impl<B: ProviderBuilder> ProviderAuthority<B> {
    /// Creates an authority with default cache tuning (100 entries, 1h TTL).
    #[must_use]
    pub fn new(store: Arc<dyn ConfigStore>, builder: B) -> Self {
        Self::with_config(store, builder, AuthorityConfig::default())
    }

    /// Creates an authority with explicit cache tuning.
    #[must_use]
    pub fn with_config(store: Arc<dyn ConfigStore>, builder: B, config: AuthorityConfig) -> Self {
        Self {
            authority_id: store.kind().to_string(),
            store,
            builder,
            cache: ProviderCache::new(config.capacity, config.ttl),
            in_flight: DashMap::new(),
        }
    }

    /// The provider kind this authority serves.
    #[must_use]
    pub fn authority_id(&self) -> &str {
        &self.authority_id
    }

    /// Checks whether a configuration record exists for the id. Store
    /// lookup only: no cache interaction, no build.
    ///
    /// ## Errors
    ///
    /// Propagates store failures.
    pub async fn has_provider(&self, provider_id: &str) -> RegistryResult<bool> {
        Ok(self.store.has_provider(provider_id).await?)
    }

    /// Resolves a provider id to a live instance, or `None` when no record
    /// exists, the record is malformed, or the build fails.
    ///
    /// ## Errors
    ///
    /// Only store backend failures surface as `Err`; they are never folded
    /// into `Ok(None)`.
    pub async fn find_provider(
        &self,
        provider_id: &str,
    ) -> RegistryResult<Option<Arc<B::Output>>> {
        let Some(record) = self.lookup_record(provider_id).await? else {
            // No record (or an undecodable one): any cached instance for
            // this id is stale.
            self.cache.remove(provider_id);
            return Ok(None);
        };

        let mut outcome = self.resolve(&record).await;
        // A resolve may also join an in-flight build started from an older
        // record, so re-check after every attempt: the instance handed out
        // must be at least as new as the record just read. Each stale
        // attempt is evicted; the loop ends once a build from a record at
        // this version (or newer) settles.
        while let Ok((_, cached_version)) = &outcome {
            if *cached_version >= record.version {
                break;
            }
            self.cache.remove(provider_id);
            outcome = self.resolve(&record).await;
        }

        match outcome {
            Ok((provider, _)) => Ok(Some(provider)),
            Err(err) => {
                if err.is_store_failure() {
                    // A failure persisting or re-reading during the build
                    // is a backend failure like any other.
                    return Err(RegistryError::Store(StorageError::Internal(
                        err.to_string(),
                    )));
                }
                tracing::warn!(
                    authority = %self.authority_id,
                    provider_id = %provider_id,
                    error = %err,
                    "provider resolution failed"
                );
                Ok(None)
            }
        }
    }

    /// Resolves a provider id to a live instance.
    ///
    /// ## Errors
    ///
    /// Returns `RegistryError::NotFound` when the id does not resolve for
    /// any non-backend reason (absent record, malformed configuration,
    /// failed build); store backend failures propagate distinctly.
    pub async fn get_provider(&self, provider_id: &str) -> RegistryResult<Arc<B::Output>> {
        self.find_provider(provider_id)
            .await?
            .ok_or_else(|| RegistryError::not_found(&self.authority_id, provider_id))
    }

    /// Resolves every provider configured for a realm, dropping ids that
    /// fail to resolve so one misconfigured provider cannot take down the
    /// whole tenant listing.
    ///
    /// ## Errors
    ///
    /// Propagates store failures.
    pub async fn providers_by_realm(
        &self,
        realm: &str,
    ) -> RegistryResult<Vec<Arc<B::Output>>> {
        let records = self.store.find_by_realm(realm).await?;
        let mut providers = Vec::with_capacity(records.len());
        for record in records {
            match self.find_provider(&record.provider_id).await? {
                Some(provider) => providers.push(provider),
                None => {
                    tracing::debug!(
                        authority = %self.authority_id,
                        provider_id = %record.provider_id,
                        realm = %realm,
                        "dropping unresolvable provider from realm listing"
                    );
                }
            }
        }
        Ok(providers)
    }

    /// Evicts the cached instance for one provider id. Callers removing a
    /// configuration record pair the removal with this on every authority
    /// that might hold the id.
    pub fn invalidate(&self, provider_id: &str) {
        self.cache.remove(provider_id);
    }

    /// Evicts all cached instances.
    pub fn invalidate_all(&self) {
        self.cache.clear();
    }

    /// Number of currently cached provider instances.
    #[must_use]
    pub fn cached_providers(&self) -> usize {
        self.cache.len()
    }

    /// Reads the record, mapping an undecodable document to "no record"
    /// (logged) while letting backend failures through.
    async fn lookup_record(
        &self,
        provider_id: &str,
    ) -> RegistryResult<Option<ProviderConfig>> {
        match self.store.find_by_provider_id(provider_id).await {
            Ok(found) => Ok(found),
            Err(err) if err.is_serialization() => {
                tracing::warn!(
                    authority = %self.authority_id,
                    provider_id = %provider_id,
                    error = %err,
                    "configuration record is malformed"
                );
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Returns the cached instance for the record's id, building it when
    /// absent or expired. The returned version is the one the instance was
    /// built from, which the caller compares against the record.
    async fn resolve(&self, record: &ProviderConfig) -> BuildOutcome<B::Output> {
        if let Some(hit) = self.cache.get(&record.provider_id) {
            return Ok(hit);
        }
        self.build_single_flight(record).await
    }

    /// Builds with the at-most-one-concurrent-build-per-key guarantee.
    ///
    /// All callers racing on one id share a `OnceCell`: exactly one runs
    /// the builder, the rest await and observe the same outcome. The slot
    /// is dropped once the build settles, so a failure is never cached and
    /// the next (non-concurrent) access retries.
    async fn build_single_flight(&self, record: &ProviderConfig) -> BuildOutcome<B::Output> {
        let provider_id = record.provider_id.as_str();
        let cell = self
            .in_flight
            .entry(provider_id.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let outcome = cell
            .get_or_init(|| async {
                tracing::debug!(
                    authority = %self.authority_id,
                    provider_id = %provider_id,
                    version = record.version,
                    "building provider instance"
                );
                match self.builder.build(record).await {
                    Ok(provider) => {
                        let provider = Arc::new(provider);
                        self.cache
                            .insert(provider_id, Arc::clone(&provider), record.version);
                        Ok((provider, record.version))
                    }
                    Err(err) => Err(Arc::new(err)),
                }
            })
            .await
            .clone();

        // Retire this generation's slot; every participant attempts the
        // removal, the ptr_eq guard keeps a successor's slot intact.
        self.in_flight
            .remove_if(provider_id, |_, slot| Arc::ptr_eq(slot, &cell));

        outcome
    }
}

impl<B: ProviderBuilder> std::fmt::Debug for ProviderAuthority<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderAuthority")
            .field("authority_id", &self.authority_id)
            .field("cached_providers", &self.cache.len())
            .finish_non_exhaustive()
    }
}
