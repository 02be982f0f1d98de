//! The stored package document and its nested maps.
//!
//! A [`PackageDocument`] is the one record the store keeps per package name.
//! Presence matters as much as content: a full-document merge only touches
//! the parts of the stored document whose counterpart the client actually
//! sent, so every collection field is an `Option` that distinguishes "absent"
//! from "empty".
//!
//! Key order of `versions`, `dist-tags` and `_attachments` follows insertion
//! order. Readme consolidation and the create-time `latest` choice both walk
//! versions in that order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::record::VersionRecord;

/// Ordered version map keyed by canonical version string.
pub type Versions = IndexMap<String, VersionRecord>;

/// Ordered dist-tag map (tag name to version).
pub type DistTags = IndexMap<String, String>;

/// The `latest` dist-tag.
pub const LATEST: &str = "latest";

// ---------------------------------------------------------------------------
// PackageDocument
// ---------------------------------------------------------------------------

/// Root document for one package.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageDocument {
    /// Document id; equal to the package name.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Opaque revision token of the stored state.
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,

    /// Package name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Tag to version pointers.
    #[serde(rename = "dist-tags", default, skip_serializing_if = "Option::is_none")]
    pub dist_tags: Option<DistTags>,

    /// Published versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Versions>,

    /// People allowed to publish.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainers: Option<Vec<Person>>,

    /// Per-user settings (stars and the like), keyed by identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Map<String, Value>>,

    /// Lifecycle timestamps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeMap>,

    /// Consolidated readme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,

    /// Filename the consolidated readme came from.
    #[serde(
        rename = "readmeFilename",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub readme_filename: Option<String>,

    /// Inline attachments (tarballs).
    #[serde(rename = "_attachments", default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<IndexMap<String, Attachment>>,

    /// Every other root field, in original order.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackageDocument {
    /// The version map, created empty if absent.
    pub fn versions_mut(&mut self) -> &mut Versions {
        self.versions.get_or_insert_with(Versions::new)
    }

    /// The dist-tag map, created empty if absent.
    pub fn dist_tags_mut(&mut self) -> &mut DistTags {
        self.dist_tags.get_or_insert_with(DistTags::new)
    }

    /// The time map, created empty if absent.
    pub fn time_mut(&mut self) -> &mut TimeMap {
        self.time.get_or_insert_with(TimeMap::default)
    }

    /// Returns `true` if `version` is a key of `versions`.
    #[must_use]
    pub fn has_version(&self, version: &str) -> bool {
        self.versions
            .as_ref()
            .is_some_and(|v| v.contains_key(version))
    }

    /// The version `dist-tags.latest` points at, if set.
    #[must_use]
    pub fn latest_tag(&self) -> Option<&str> {
        self.dist_tags.as_ref()?.get(LATEST).map(String::as_str)
    }

    /// The record `dist-tags.latest` resolves to, if any.
    #[must_use]
    pub fn latest_record(&self) -> Option<&VersionRecord> {
        let latest = self.latest_tag()?;
        self.versions.as_ref()?.get(latest)
    }

    /// Returns `true` if the document carries an unpublish marker.
    #[must_use]
    pub fn is_unpublished(&self) -> bool {
        self.time.as_ref().is_some_and(|t| t.unpublished.is_some())
    }

    /// Returns `true` if at least one maintainer is listed.
    #[must_use]
    pub fn has_maintainers(&self) -> bool {
        self.maintainers.as_ref().is_some_and(|m| !m.is_empty())
    }

    /// Commit `patch` over this document the way the store applies a
    /// partial write: every root field the patch carries replaces the
    /// stored one, and fields it omits are kept.
    ///
    /// Unpublish returns such a patch.
    pub fn overlay(&mut self, patch: Self) {
        let Self {
            id,
            rev,
            name,
            dist_tags,
            versions,
            maintainers,
            users,
            time,
            readme,
            readme_filename,
            attachments,
            extra,
        } = patch;
        replace(&mut self.id, id);
        replace(&mut self.rev, rev);
        replace(&mut self.name, name);
        replace(&mut self.dist_tags, dist_tags);
        replace(&mut self.versions, versions);
        replace(&mut self.maintainers, maintainers);
        replace(&mut self.users, users);
        replace(&mut self.time, time);
        replace(&mut self.readme, readme);
        replace(&mut self.readme_filename, readme_filename);
        replace(&mut self.attachments, attachments);
        self.extra.extend(extra);
    }

    /// Serialize to compact JSON for diagnostics.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("<unserializable: {e}>"))
    }
}

fn replace<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

// ---------------------------------------------------------------------------
// Person
// ---------------------------------------------------------------------------

/// A maintainer or publisher identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Account name.
    pub name: String,

    /// Contact address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Any other fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Person {
    /// A person with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// TimeMap
// ---------------------------------------------------------------------------

/// The document's `time` map.
///
/// Holds three reserved keys plus one entry per version, recording when that
/// version was first written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeMap {
    /// When the document was first created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// When the document was last written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,

    /// Soft-delete marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unpublished: Option<Unpublished>,

    /// Publish time per version.
    #[serde(flatten)]
    pub versions: IndexMap<String, String>,
}

/// Who unpublished the package, and when.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unpublished {
    /// Identity that issued the unpublish.
    pub name: String,
    /// ISO-8601 timestamp.
    pub time: String,
}

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

/// One `_attachments` entry.
///
/// Inline attachments carry base64 `data`. Stubs reference content the store
/// already holds and carry `stub: true` instead.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Base64 payload, present for inline uploads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// Payload length in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,

    /// Set on references to already-stored content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stub: Option<bool>,

    /// Any other fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attachment {
    /// Returns `true` if the attachment carries an inline payload.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.data.as_deref().is_some_and(|d| !d.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Truthiness
// ---------------------------------------------------------------------------

/// JSON truthiness: `null`, `false`, `0` and `""` are falsy.
///
/// Copy-up and user merge treat falsy values as absent.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
