//! Backend store failures must surface to callers, never masquerade as an
//! absent provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use idp_model::ProviderConfig;
use idp_registry::ProviderAuthority;
use idp_storage::{ConfigStore, StorageError, StorageResult};

use crate::common::{init_tracing, SharedBuilder, SlowBuilder};

/// A store whose backend is down: every operation fails with a connection
/// error.
struct UnreachableStore {
    lookups: AtomicUsize,
}

impl UnreachableStore {
    fn new() -> Self {
        Self {
            lookups: AtomicUsize::new(0),
        }
    }

    fn refused(&self) -> StorageError {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        StorageError::Connection("connection refused".to_string())
    }
}

#[async_trait]
impl ConfigStore for UnreachableStore {
    fn kind(&self) -> &str {
        "oidc"
    }

    async fn find_by_provider_id(
        &self,
        _provider_id: &str,
    ) -> StorageResult<Option<ProviderConfig>> {
        Err(self.refused())
    }

    async fn find_all(&self) -> StorageResult<Vec<ProviderConfig>> {
        Err(self.refused())
    }

    async fn find_by_realm(&self, _realm: &str) -> StorageResult<Vec<ProviderConfig>> {
        Err(self.refused())
    }

    async fn add_registration(&self, _record: &ProviderConfig) -> StorageResult<ProviderConfig> {
        Err(self.refused())
    }

    async fn remove_registration(&self, _provider_id: &str) -> StorageResult<()> {
        Err(self.refused())
    }
}

fn unreachable_authority() -> (
    ProviderAuthority<SharedBuilder>,
    Arc<SlowBuilder>,
) {
    init_tracing();
    let builder = Arc::new(SlowBuilder::immediate());
    let authority = ProviderAuthority::new(
        Arc::new(UnreachableStore::new()) as Arc<dyn ConfigStore>,
        SharedBuilder(Arc::clone(&builder)),
    );
    (authority, builder)
}

#[tokio::test]
async fn find_provider_propagates_backend_failure() {
    let (authority, builder) = unreachable_authority();

    // A down backend is an error, not "no such provider": Ok(None) here
    // would trigger incorrect auto-creation upstream.
    let err = authority.find_provider("p1").await.unwrap_err();
    assert!(err.is_store_failure());
    assert!(!err.is_not_found());
    assert_eq!(builder.build_count(), 0);
}

#[tokio::test]
async fn get_provider_distinguishes_failure_from_not_found() {
    let (authority, _) = unreachable_authority();

    let err = authority.get_provider("p1").await.unwrap_err();
    assert!(err.is_store_failure());
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn realm_listing_propagates_backend_failure() {
    let (authority, builder) = unreachable_authority();

    // Degradation covers unresolvable individual records only; a failed
    // realm scan must not be reported as an empty realm.
    let err = authority.providers_by_realm("acme").await.unwrap_err();
    assert!(err.is_store_failure());
    assert_eq!(builder.build_count(), 0);
}

#[tokio::test]
async fn has_provider_propagates_backend_failure() {
    let (authority, _) = unreachable_authority();
    assert!(authority.has_provider("p1").await.unwrap_err().is_store_failure());
}
