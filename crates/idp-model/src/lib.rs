//! # idp-model
//!
//! Domain model for provider configuration records.
//!
//! Every pluggable provider instance (identity broker, attribute mapper,
//! credential provider, template provider, ...) is described by one
//! [`ProviderConfig`] record, scoped to a realm and versioned by the store
//! that persists it.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod record;

pub use record::{ConfigMap, ProviderConfig, BASELINE_VERSION};
