//! In-memory configuration store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use idp_model::{ProviderConfig, BASELINE_VERSION};
use tokio::sync::RwLock;

use crate::document;
use crate::error::{StorageError, StorageResult};
use crate::store::{require_key, ConfigStore};

/// What the store actually persists per record: the encoded document plus
/// the store-owned metadata. Records round-trip through the shared document
/// codec so a corrupt blob fails identically to a durable backend.
#[derive(Debug, Clone)]
struct StoredRecord {
    realm: String,
    version: i64,
    document: Vec<u8>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// In-memory [`ConfigStore`], used by tests and single-node deployments.
///
/// Backed by a `tokio::sync::RwLock<HashMap>`; reads proceed concurrently,
/// writes are exclusive. Version semantics match the SQL backend: baseline
/// on insert, increment on every replacing upsert.
pub struct MemoryConfigStore {
    kind: String,
    discriminator: Option<String>,
    records: RwLock<HashMap<String, StoredRecord>>,
}

impl MemoryConfigStore {
    /// Creates an empty store bound to the given kind.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            discriminator: None,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Additionally scopes the store by a discriminator, for code paths
    /// that share a kind.
    #[must_use]
    pub fn with_discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    /// The discriminator this store is scoped by, if any.
    #[must_use]
    pub fn discriminator(&self) -> Option<&str> {
        self.discriminator.as_deref()
    }

    /// Inserts a raw document blob, bypassing the codec. Lets tests stage
    /// a corrupt record the way a bad write from another process would.
    pub async fn insert_raw(&self, provider_id: &str, realm: &str, document: Vec<u8>) {
        let now = Utc::now();
        self.records.write().await.insert(
            provider_id.to_string(),
            StoredRecord {
                realm: realm.to_string(),
                version: BASELINE_VERSION,
                document,
                created_at: now,
                updated_at: now,
            },
        );
    }

    fn to_record(&self, provider_id: &str, stored: &StoredRecord) -> StorageResult<ProviderConfig> {
        let document = document::decode(provider_id, &stored.document)?;
        Ok(ProviderConfig {
            kind: self.kind.clone(),
            provider_id: provider_id.to_string(),
            realm: stored.realm.clone(),
            version: stored.version,
            settings: document.settings,
            config: document.config,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }

    /// Decodes a scan result, skipping corrupt records so one bad row
    /// cannot fail a whole listing. Point lookups report the error instead.
    fn collect_scan<'a, I>(&self, entries: I) -> Vec<ProviderConfig>
    where
        I: Iterator<Item = (&'a String, &'a StoredRecord)>,
    {
        let mut records = Vec::new();
        for (provider_id, stored) in entries {
            match self.to_record(provider_id, stored) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(
                        kind = %self.kind,
                        provider_id = %provider_id,
                        error = %err,
                        "skipping undecodable configuration record in scan"
                    );
                }
            }
        }
        records
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn find_by_provider_id(
        &self,
        provider_id: &str,
    ) -> StorageResult<Option<ProviderConfig>> {
        require_key(provider_id, "provider id")?;
        let records = self.records.read().await;
        records
            .get(provider_id)
            .map(|stored| self.to_record(provider_id, stored))
            .transpose()
    }

    async fn find_all(&self) -> StorageResult<Vec<ProviderConfig>> {
        let records = self.records.read().await;
        Ok(self.collect_scan(records.iter()))
    }

    async fn find_by_realm(&self, realm: &str) -> StorageResult<Vec<ProviderConfig>> {
        require_key(realm, "realm")?;
        let records = self.records.read().await;
        Ok(self.collect_scan(records.iter().filter(|(_, s)| s.realm == realm)))
    }

    async fn add_registration(&self, record: &ProviderConfig) -> StorageResult<ProviderConfig> {
        require_key(&record.provider_id, "provider id")?;
        if record.kind != self.kind {
            return Err(StorageError::InvalidData(format!(
                "record kind '{}' does not match store kind '{}'",
                record.kind, self.kind
            )));
        }

        let document = document::encode(&record.provider_id, &record.settings, &record.config)?;
        let now = Utc::now();

        let mut records = self.records.write().await;
        let stored = match records.get(&record.provider_id) {
            Some(existing) => StoredRecord {
                realm: record.realm.clone(),
                version: existing.version + 1,
                document,
                created_at: existing.created_at,
                updated_at: now,
            },
            None => StoredRecord {
                realm: record.realm.clone(),
                version: BASELINE_VERSION,
                document,
                created_at: now,
                updated_at: now,
            },
        };
        let persisted = self.to_record(&record.provider_id, &stored)?;
        records.insert(record.provider_id.clone(), stored);
        Ok(persisted)
    }

    async fn remove_registration(&self, provider_id: &str) -> StorageResult<()> {
        require_key(provider_id, "provider id")?;
        self.records.write().await.remove(provider_id);
        Ok(())
    }
}
