//! Connecting the configuration store to `PostgreSQL`.

use std::time::Duration;

use idp_storage::StorageError;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::run_migrations;

/// Connection settings for the store's `PostgreSQL` backend.
///
/// Provider resolution sits on the hot path of authenticated requests, so
/// the defaults size the pool small and make acquisition fail fast: a
/// saturated pool surfaces as a store failure instead of queueing logins
/// behind it. Knobs the store does not tune keep the sqlx defaults.
#[derive(Debug, Clone)]
pub struct StoreConnection {
    url: String,
    pool_size: u32,
    acquire_timeout: Duration,
    migrate_on_connect: bool,
}

impl StoreConnection {
    /// Connection settings for the given database URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: 8,
            acquire_timeout: Duration::from_secs(5),
            migrate_on_connect: false,
        }
    }

    /// Sets the pool size.
    #[must_use]
    pub const fn pool_size(mut self, size: u32) -> Self {
        self.pool_size = size;
        self
    }

    /// Sets how long a caller waits for a free connection before the
    /// acquisition is reported as a connection failure.
    #[must_use]
    pub const fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Applies the embedded schema migrations as part of [`Self::connect`].
    /// Off by default; deployments that manage the schema externally leave
    /// it off.
    #[must_use]
    pub const fn migrate_on_connect(mut self) -> Self {
        self.migrate_on_connect = true;
        self
    }

    /// Opens the connection pool, applying migrations when configured.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Connection` if the pool cannot be opened and
    /// `StorageError::Internal` if a migration fails to apply.
    pub async fn connect(&self) -> Result<PgPool, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(self.pool_size)
            .acquire_timeout(self.acquire_timeout)
            .connect(&self.url)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if self.migrate_on_connect {
            run_migrations(&pool).await?;
        }
        Ok(pool)
    }
}
