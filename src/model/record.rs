//! A single published version of a package.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::document::Person;

/// One entry of a package document's `versions` map.
///
/// Fields the engine reads or writes are typed; everything else a client
/// publishes (`dist`, `dependencies`, `scripts`, ...) is carried in `extra`
/// untouched. Equality is structural across both, which is what the
/// immutability check relies on.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// `"<name>@<version>"`.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Package name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Canonical version string; equal to the record's key once stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Snapshot of the document's maintainers at publish time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainers: Option<Vec<Person>>,

    /// Identity that published this version.
    #[serde(rename = "_npmUser", default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<Person>,

    /// Publish-time settings. Private keys are stripped before storing.
    #[serde(
        rename = "publishConfig",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub publish_config: Option<Map<String, Value>>,

    /// Deprecation notice. The only field that may change after publish.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,

    /// Directory layout hints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directories: Option<Value>,

    /// Dist-tag requested by the publishing client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Readme text. Only present in transit; promoted to the document root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,

    /// Readme filename. Only present in transit.
    #[serde(
        rename = "readmeFilename",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub readme_filename: Option<String>,

    /// Every other field, in original order.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VersionRecord {
    /// Returns `true` if the record carries a non-empty deprecation notice.
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.deprecated.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Returns `true` if `directories` is present and serializes to `{}`.
    #[must_use]
    pub fn has_empty_directories(&self) -> bool {
        matches!(&self.directories, Some(Value::Object(map)) if map.is_empty())
    }

    /// Remove every `publishConfig` key that starts with `prefix`.
    pub fn strip_private_publish_config(&mut self, prefix: &str) {
        if let Some(config) = self.publish_config.as_mut() {
            config.retain(|key, _| !key.starts_with(prefix));
        }
    }

    /// The tag requested in `publishConfig.tag`, if it is a non-empty string.
    #[must_use]
    pub fn publish_config_tag(&self) -> Option<&str> {
        self.publish_config
            .as_ref()?
            .get("tag")?
            .as_str()
            .filter(|t| !t.is_empty())
    }

    /// The tag requested in the record itself, if non-empty.
    #[must_use]
    pub fn requested_tag(&self) -> Option<&str> {
        self.tag.as_deref().filter(|t| !t.is_empty())
    }

    /// Serialize to compact JSON for diagnostics.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("<unserializable: {e}>"))
    }
}
