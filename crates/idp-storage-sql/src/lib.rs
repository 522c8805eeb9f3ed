//! # idp-storage-sql
//!
//! `PostgreSQL` implementation of the configuration store.
//!
//! One row per `(kind, provider_id)`; the record's `settings`/`config` pair
//! is persisted as a single opaque document blob, and the version bump on
//! upsert happens atomically inside the `ON CONFLICT` clause so version
//! monotonicity holds under concurrent writers.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod entities;
pub mod error;
pub mod pool;
pub mod store;

pub use pool::StoreConnection;
pub use store::PgConfigStore;

/// Runs the embedded schema migrations.
///
/// ## Errors
///
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), idp_storage::StorageError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| idp_storage::StorageError::Internal(e.to_string()))
}
