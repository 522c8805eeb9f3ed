//! Opaque per-record document encoding.
//!
//! Each persisted record carries its `settings` and `config` maps as a
//! single self-describing blob rather than relational columns, because every
//! provider kind has a structurally different config shape. The encoding is
//! the serde_json byte form of [`ConfigDocument`]; field participation is
//! governed solely by the declared data fields, so the layout cannot drift
//! with incidental accessor naming. All store backends share this codec so
//! a record written by one backend decodes identically everywhere.

use idp_model::ConfigMap;
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};

/// The document stored as one blob per record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// Kind-agnostic operational flags.
    pub settings: ConfigMap,
    /// Kind-specific builder parameters.
    pub config: ConfigMap,
}

/// Encodes a record's `settings`/`config` pair into the blob form.
///
/// ## Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode(provider_id: &str, settings: &ConfigMap, config: &ConfigMap) -> StorageResult<Vec<u8>> {
    let document = ConfigDocument {
        settings: settings.clone(),
        config: config.clone(),
    };
    serde_json::to_vec(&document)
        .map_err(|e| StorageError::serialization(provider_id, e.to_string()))
}

/// Decodes a blob back into the `settings`/`config` pair.
///
/// ## Errors
///
/// Returns `StorageError::Serialization` if the blob is not a well-formed
/// document; a partial or corrupt record is never returned silently
/// truncated.
pub fn decode(provider_id: &str, bytes: &[u8]) -> StorageResult<ConfigDocument> {
    serde_json::from_slice(bytes)
        .map_err(|e| StorageError::serialization(provider_id, e.to_string()))
}
