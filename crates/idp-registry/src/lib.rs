//! # idp-registry
//!
//! Per-kind provider authority: resolves provider ids to live, ready-to-use
//! provider instances on demand, backed by a configuration store.
//!
//! A [`ProviderAuthority`] owns a bounded, time-limited cache of built
//! provider instances keyed by provider id. Cache misses invoke the kind's
//! [`ProviderBuilder`] exactly once per id no matter how many callers race
//! on it, and every access re-checks the store's version counter so a
//! configuration update made anywhere (another node, an admin API) is
//! picked up on the next resolution without a restart.
//!
//! ```ignore
//! let store = Arc::new(PgConfigStore::new(pool, "oidc"));
//! let authority = ProviderAuthority::new(store, OidcBrokerBuilder::new(http));
//!
//! let broker = authority.get_provider("corp-idp").await?;
//! ```

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod authority;
pub mod builder;
mod cache;
pub mod error;

pub use authority::{AuthorityConfig, ProviderAuthority};
pub use builder::ProviderBuilder;
pub use error::{RegistryError, RegistryResult};
