//! Database entity types for `SQLx`.
//!
//! These types map directly to database rows and are converted to domain
//! records by decoding the opaque document blob.

use chrono::{DateTime, Utc};
use idp_model::ProviderConfig;
use idp_storage::{document, StorageResult};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for provider configuration records.
#[derive(Debug, Clone, FromRow)]
pub struct ConfigRow {
    /// Surrogate row id.
    pub id: Uuid,
    /// Provider kind (store partition).
    pub kind: String,
    /// Store discriminator; empty string when unused.
    pub discriminator: String,
    /// Provider id, unique within `(kind, discriminator)`.
    pub provider_id: String,
    /// Owning realm.
    pub realm: String,
    /// Store-maintained version counter.
    pub version: i64,
    /// Encoded `{settings, config}` document.
    pub document: Vec<u8>,
    /// First persisted.
    pub created_at: DateTime<Utc>,
    /// Last updated.
    pub updated_at: DateTime<Utc>,
}

impl ConfigRow {
    /// Decodes the row's document into a domain record.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Serialization` if the document blob is
    /// corrupt - the row is never returned silently truncated.
    pub fn into_record(self) -> StorageResult<ProviderConfig> {
        let decoded = document::decode(&self.provider_id, &self.document)?;
        Ok(ProviderConfig {
            kind: self.kind,
            provider_id: self.provider_id,
            realm: self.realm,
            version: self.version,
            settings: decoded.settings,
            config: decoded.config,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
