//! `PostgreSQL` implementation of the configuration store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use idp_model::{ProviderConfig, BASELINE_VERSION};
use idp_storage::store::{require_key, ConfigStore};
use idp_storage::{document, StorageError, StorageResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ConfigRow;
use crate::error::from_sqlx_error;

/// `PostgreSQL` configuration store, bound to one provider kind.
pub struct PgConfigStore {
    pool: PgPool,
    kind: String,
    discriminator: String,
}

impl PgConfigStore {
    /// Creates a store bound to the given kind.
    #[must_use]
    pub fn new(pool: PgPool, kind: impl Into<String>) -> Self {
        Self {
            pool,
            kind: kind.into(),
            discriminator: String::new(),
        }
    }

    /// Additionally scopes the store by a discriminator, for code paths
    /// that share a kind.
    #[must_use]
    pub fn with_discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = discriminator.into();
        self
    }

    /// Decodes scan rows, skipping corrupt documents so one bad row cannot
    /// fail a whole listing. Point lookups report the error instead.
    fn collect_scan(&self, rows: Vec<ConfigRow>) -> Vec<ProviderConfig> {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let provider_id = row.provider_id.clone();
            match row.into_record() {
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
impl ConfigStore for PgConfigStore {
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn find_by_provider_id(
        &self,
        provider_id: &str,
    ) -> StorageResult<Option<ProviderConfig>> {
        require_key(provider_id, "provider id")?;
        let row = sqlx::query_as::<_, ConfigRow>(
            r"SELECT id, kind, discriminator, provider_id, realm, version,
                     document, created_at, updated_at
              FROM provider_configs
              WHERE kind = $1 AND discriminator = $2 AND provider_id = $3",
        )
        .bind(&self.kind)
        .bind(&self.discriminator)
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(from_sqlx_error)?;

        row.map(ConfigRow::into_record).transpose()
    }

    async fn find_all(&self) -> StorageResult<Vec<ProviderConfig>> {
        let rows = sqlx::query_as::<_, ConfigRow>(
            r"SELECT id, kind, discriminator, provider_id, realm, version,
                     document, created_at, updated_at
              FROM provider_configs
              WHERE kind = $1 AND discriminator = $2
              ORDER BY provider_id",
        )
        .bind(&self.kind)
        .bind(&self.discriminator)
        .fetch_all(&self.pool)
        .await
        .map_err(from_sqlx_error)?;

        Ok(self.collect_scan(rows))
    }

    async fn find_by_realm(&self, realm: &str) -> StorageResult<Vec<ProviderConfig>> {
        require_key(realm, "realm")?;
        let rows = sqlx::query_as::<_, ConfigRow>(
            r"SELECT id, kind, discriminator, provider_id, realm, version,
                     document, created_at, updated_at
              FROM provider_configs
              WHERE kind = $1 AND discriminator = $2 AND realm = $3
              ORDER BY provider_id",
        )
        .bind(&self.kind)
        .bind(&self.discriminator)
        .bind(realm)
        .fetch_all(&self.pool)
        .await
        .map_err(from_sqlx_error)?;

        Ok(self.collect_scan(rows))
    }

    async fn add_registration(&self, record: &ProviderConfig) -> StorageResult<ProviderConfig> {
        require_key(&record.provider_id, "provider id")?;
        if record.kind != self.kind {
            return Err(StorageError::InvalidData(format!(
                "record kind '{}' does not match store kind '{}'",
                record.kind, self.kind
            )));
        }

        let encoded = document::encode(&record.provider_id, &record.settings, &record.config)?;
        let now = Utc::now();

        // The version bump happens inside the ON CONFLICT clause so it is
        // atomic with the document replacement; RETURNING hands back the
        // store-assigned state.
        let (version, created_at, updated_at) =
            sqlx::query_as::<_, (i64, DateTime<Utc>, DateTime<Utc>)>(
                r"INSERT INTO provider_configs (
                    id, kind, discriminator, provider_id, realm, version,
                    document, created_at, updated_at
                  ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                  ON CONFLICT (kind, discriminator, provider_id)
                  DO UPDATE SET
                    realm = EXCLUDED.realm,
                    document = EXCLUDED.document,
                    version = provider_configs.version + 1,
                    updated_at = EXCLUDED.updated_at
                  RETURNING version, created_at, updated_at",
            )
            .bind(Uuid::now_v7())
            .bind(&self.kind)
            .bind(&self.discriminator)
            .bind(&record.provider_id)
            .bind(&record.realm)
            .bind(BASELINE_VERSION)
            .bind(&encoded)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(from_sqlx_error)?;

        Ok(ProviderConfig {
            version,
            created_at,
            updated_at,
            ..record.clone()
        })
    }

    async fn remove_registration(&self, provider_id: &str) -> StorageResult<()> {
        require_key(provider_id, "provider id")?;
        // Idempotent: zero rows affected is fine.
        sqlx::query(
            r"DELETE FROM provider_configs
              WHERE kind = $1 AND discriminator = $2 AND provider_id = $3",
        )
        .bind(&self.kind)
        .bind(&self.discriminator)
        .bind(provider_id)
        .execute(&self.pool)
        .await
        .map_err(from_sqlx_error)?;

        Ok(())
    }
}
