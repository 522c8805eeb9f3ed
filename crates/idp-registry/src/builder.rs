//! Provider builder trait.

use async_trait::async_trait;
use idp_model::ProviderConfig;

use crate::error::RegistryResult;

/// Turns a configuration record into a live provider instance.
///
/// One implementation exists per provider kind (OIDC broker, password
/// hasher, attribute webhook, template renderer, ...). A build may be
/// expensive - parsing settings, opening HTTP clients, materializing key
/// material - which is why the authority caches the result and guarantees
/// at most one concurrent build per provider id.
///
/// Builders validate their kind's configuration invariants (required URLs,
/// at least one enabled attribute set, ...) and fail the build on invalid
/// input; the authority treats any build error as "provider unavailable"
/// for that access and never caches it. Long-running work inside `build`
/// should carry its own timeouts (e.g. HTTP client connect/read timeouts)
/// so waiting callers are eventually released.
#[async_trait]
pub trait ProviderBuilder: Send + Sync {
    /// The live provider type this builder produces.
    type Output: Send + Sync + 'static;

    /// Builds a provider instance from the record.
    ///
    /// ## Errors
    ///
    /// Returns `RegistryError::Configuration` if the record's config does
    /// not decode or validate, or `RegistryError::Build` if construction
    /// itself fails.
    async fn build(&self, record: &ProviderConfig) -> RegistryResult<Self::Output>;
}
