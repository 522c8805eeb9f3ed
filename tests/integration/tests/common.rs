//! Shared fixtures: a configurable test builder and record helpers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use idp_model::ProviderConfig;
use idp_registry::{ProviderBuilder, RegistryError, RegistryResult};

/// Initializes tracing once for the test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("idp_registry=debug,idp_storage=debug")
        .try_init();
}

/// A built "provider": the config snapshot it was constructed from.
#[derive(Debug)]
pub struct TestProvider {
    pub issuer_url: String,
}

/// Builder that records invocation counts, optionally sleeps to simulate an
/// expensive build, and rejects records missing `issuer_url`.
pub struct SlowBuilder {
    pub builds: AtomicUsize,
    pub delay: Duration,
}

impl SlowBuilder {
    pub fn new(delay: Duration) -> Self {
        Self {
            builds: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn immediate() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderBuilder for SlowBuilder {
    type Output = TestProvider;

    async fn build(&self, record: &ProviderConfig) -> RegistryResult<TestProvider> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if self.delay > Duration::ZERO {
            tokio::time::sleep(self.delay).await;
        }
        let issuer_url = record
            .config
            .get("issuer_url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                RegistryError::configuration(&record.provider_id, "issuer_url is required")
            })?;
        Ok(TestProvider {
            issuer_url: issuer_url.to_string(),
        })
    }
}

/// Shared-builder wrapper so tests can keep a handle on the counters while
/// the authority owns the builder.
pub struct SharedBuilder(pub Arc<SlowBuilder>);

#[async_trait]
impl ProviderBuilder for SharedBuilder {
    type Output = TestProvider;

    async fn build(&self, record: &ProviderConfig) -> RegistryResult<TestProvider> {
        self.0.build(record).await
    }
}

/// A valid record for the `oidc` kind.
pub fn oidc_record(provider_id: &str, realm: &str, issuer: &str) -> ProviderConfig {
    ProviderConfig::new("oidc", provider_id, realm).with_config("issuer_url", issuer)
}
