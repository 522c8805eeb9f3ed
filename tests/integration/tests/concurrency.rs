//! Concurrency properties: at-most-one-build and independent-key
//! parallelism.

use std::sync::Arc;
use std::time::{Duration, Instant};

use idp_registry::ProviderAuthority;
use idp_storage::{ConfigStore, MemoryConfigStore};

use crate::common::{init_tracing, oidc_record, SharedBuilder, SlowBuilder};

const BUILD_DELAY: Duration = Duration::from_millis(50);

async fn slow_authority(
    records: &[(&str, &str)],
) -> (Arc<ProviderAuthority<SharedBuilder>>, Arc<SlowBuilder>) {
    init_tracing();
    let store = MemoryConfigStore::new("oidc");
    for (provider_id, realm) in records {
        store
            .add_registration(&oidc_record(provider_id, realm, "https://idp.example.com"))
            .await
            .unwrap();
    }
    let builder = Arc::new(SlowBuilder::new(BUILD_DELAY));
    let authority = Arc::new(ProviderAuthority::new(
        Arc::new(store) as Arc<dyn ConfigStore>,
        SharedBuilder(Arc::clone(&builder)),
    ));
    (authority, builder)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_callers_share_one_build() -> anyhow::Result<()> {
    let (authority, builder) = slow_authority(&[("p3", "acme")]).await;

    let started = Instant::now();
    let mut handles = Vec::new();
    for _ in 0..10 {
        let authority = Arc::clone(&authority);
        handles.push(tokio::spawn(async move {
            authority.get_provider("p3").await
        }));
    }

    let mut providers = Vec::new();
    for handle in handles {
        providers.push(handle.await??);
    }
    let elapsed = started.elapsed();

    // Exactly one build ran, every caller got the same instance, and the
    // whole batch took about one build duration rather than ten.
    assert_eq!(builder.build_count(), 1);
    for provider in &providers[1..] {
        assert!(Arc::ptr_eq(&providers[0], provider));
    }
    assert!(
        elapsed < BUILD_DELAY * 5,
        "10 concurrent calls took {elapsed:?}, expected ~{BUILD_DELAY:?}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn distinct_keys_build_in_parallel() -> anyhow::Result<()> {
    let ids: Vec<String> = (0..8).map(|i| format!("p{i}")).collect();
    let records: Vec<(&str, &str)> = ids.iter().map(|id| (id.as_str(), "acme")).collect();
    let (authority, builder) = slow_authority(&records).await;

    let started = Instant::now();
    let mut handles = Vec::new();
    for id in &ids {
        let authority = Arc::clone(&authority);
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            authority.get_provider(&id).await
        }));
    }
    for handle in handles {
        handle.await??;
    }
    let elapsed = started.elapsed();

    // Eight distinct keys: eight builds, but no shared lock serializes
    // them, so wall time stays near one build duration.
    assert_eq!(builder.build_count(), 8);
    assert!(
        elapsed < BUILD_DELAY * 4,
        "8 parallel builds took {elapsed:?}, expected ~{BUILD_DELAY:?}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_failures_are_shared_not_cached() -> anyhow::Result<()> {
    init_tracing();
    let store = MemoryConfigStore::new("oidc");
    // Missing issuer_url: every build attempt fails.
    store
        .add_registration(&idp_model::ProviderConfig::new("oidc", "bad", "acme"))
        .await
        .unwrap();
    let builder = Arc::new(SlowBuilder::new(BUILD_DELAY));
    let authority = Arc::new(ProviderAuthority::new(
        Arc::new(store) as Arc<dyn ConfigStore>,
        SharedBuilder(Arc::clone(&builder)),
    ));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let authority = Arc::clone(&authority);
        handles.push(tokio::spawn(async move {
            authority.find_provider("bad").await
        }));
    }
    for handle in handles {
        assert!(handle.await??.is_none());
    }

    // The concurrent batch shared one failed build ...
    assert_eq!(builder.build_count(), 1);

    // ... and the failure was not cached: a later access retries.
    assert!(authority.find_provider("bad").await?.is_none());
    assert_eq!(builder.build_count(), 2);
    Ok(())
}
