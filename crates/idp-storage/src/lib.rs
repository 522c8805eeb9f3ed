//! # idp-storage
//!
//! Configuration store abstraction for the identity platform.
//!
//! This crate defines the durable persistence contract for provider
//! configuration records and two implementations of supporting machinery:
//!
//! - [`ConfigStore`] - the store trait, bound to one provider kind
//! - [`AutoCreateStore`] - decorator that lazily provisions default records
//!   on first lookup miss
//! - [`MemoryConfigStore`] - in-memory store for tests and single-node use
//! - [`document`] - the opaque per-record document encoding shared by all
//!   store backends

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod autocreate;
pub mod document;
pub mod error;
pub mod memory;
pub mod store;

pub use autocreate::{AutoCreateStore, ProviderCreator, RealmFactory};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryConfigStore;
pub use store::ConfigStore;
