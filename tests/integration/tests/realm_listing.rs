//! Graceful degradation of realm-wide provider listings.

use std::sync::Arc;

use idp_model::ProviderConfig;
use idp_registry::ProviderAuthority;
use idp_storage::{ConfigStore, MemoryConfigStore};

use crate::common::{init_tracing, oidc_record, SharedBuilder, SlowBuilder};

#[tokio::test]
async fn listing_survives_a_builder_rejected_record() -> anyhow::Result<()> {
    init_tracing();
    let store = MemoryConfigStore::new("oidc");
    store
        .add_registration(&oidc_record("p5", "r1", "https://good.example.com"))
        .await?;
    // p6 exists but its config is missing issuer_url; the builder rejects it.
    store
        .add_registration(&ProviderConfig::new("oidc", "p6", "r1"))
        .await?;

    let authority = ProviderAuthority::new(
        Arc::new(store) as Arc<dyn ConfigStore>,
        SharedBuilder(Arc::new(SlowBuilder::immediate())),
    );

    let providers = authority.providers_by_realm("r1").await?;
    assert_eq!(providers.len(), 1);
    assert_eq!(providers[0].issuer_url, "https://good.example.com");
    Ok(())
}

#[tokio::test]
async fn listing_survives_a_corrupt_record() -> anyhow::Result<()> {
    let store = MemoryConfigStore::new("oidc");
    store
        .add_registration(&oidc_record("good", "r1", "https://good.example.com"))
        .await?;
    store.insert_raw("corrupt", "r1", b"\x00\x01".to_vec()).await;

    let authority = ProviderAuthority::new(
        Arc::new(store) as Arc<dyn ConfigStore>,
        SharedBuilder(Arc::new(SlowBuilder::immediate())),
    );

    let providers = authority.providers_by_realm("r1").await?;
    assert_eq!(providers.len(), 1);
    Ok(())
}

#[tokio::test]
async fn listing_is_scoped_to_the_realm() -> anyhow::Result<()> {
    let store = MemoryConfigStore::new("oidc");
    for (id, realm) in [("a", "r1"), ("b", "r1"), ("c", "r2")] {
        store
            .add_registration(&oidc_record(id, realm, "https://idp.example.com"))
            .await?;
    }

    let authority = ProviderAuthority::new(
        Arc::new(store) as Arc<dyn ConfigStore>,
        SharedBuilder(Arc::new(SlowBuilder::immediate())),
    );

    assert_eq!(authority.providers_by_realm("r1").await?.len(), 2);
    assert_eq!(authority.providers_by_realm("r2").await?.len(), 1);
    assert!(authority.providers_by_realm("r3").await?.is_empty());
    Ok(())
}
