//! The provider configuration record.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// Version assigned to a record that has never been updated.
pub const BASELINE_VERSION: i64 = 1;

/// An opaque structured map, as stored in `settings` and `config`.
pub type ConfigMap = serde_json::Map<String, Value>;

/// A versioned description of one provider instance.
///
/// Records are partitioned by `kind` (the provider family, e.g. `"oidc"` or
/// `"webhook-attributes"`), uniquely identified within a kind by
/// `provider_id`, and owned by one `realm` (tenant). The `version` field is
/// maintained exclusively by the store: it starts at [`BASELINE_VERSION`]
/// and increases on every replacing update, and is what the provider
/// authority compares against its cache to detect stale instances.
///
/// `settings` carries kind-agnostic operational flags (enablement, priority,
/// event verbosity); `config` carries whatever parameters the kind's builder
/// needs (URLs, algorithms, trust anchors). Both are opaque to the store and
/// decoded into concrete shapes by the consumer via [`Self::settings_as`] /
/// [`Self::config_as`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider family this record configures. Store partition key.
    pub kind: String,

    /// Stable identifier of this provider instance, unique within `kind`.
    pub provider_id: String,

    /// Realm (tenant) that owns this provider instance.
    pub realm: String,

    /// Monotonically increasing version, bumped by the store on update.
    pub version: i64,

    /// Kind-agnostic operational flags.
    pub settings: ConfigMap,

    /// Kind-specific builder parameters.
    pub config: ConfigMap,

    /// When the record was first persisted.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ProviderConfig {
    /// Creates a new record at the baseline version with empty maps.
    #[must_use]
    pub fn new(
        kind: impl Into<String>,
        provider_id: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            kind: kind.into(),
            provider_id: provider_id.into(),
            realm: realm.into(),
            version: BASELINE_VERSION,
            settings: ConfigMap::new(),
            config: ConfigMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets a `config` entry (builder style).
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Sets a `settings` entry (builder style).
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Decodes `config` into a concrete kind-specific shape.
    ///
    /// ## Errors
    ///
    /// Returns the deserialization error if `config` does not match `T`;
    /// a malformed document is never silently truncated.
    pub fn config_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.config.clone()))
    }

    /// Decodes `settings` into a concrete shape.
    ///
    /// ## Errors
    ///
    /// Returns the deserialization error if `settings` does not match `T`.
    pub fn settings_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.settings.clone()))
    }

    /// Whether this provider instance is enabled. Defaults to `true` when
    /// the flag is absent.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.settings
            .get("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Ordering priority among providers of the same kind (higher first).
    /// Defaults to 0 when absent.
    #[must_use]
    pub fn priority(&self) -> i64 {
        self.settings
            .get("priority")
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }
}
