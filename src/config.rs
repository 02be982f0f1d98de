//! Engine configuration (`regdoc.toml`).
//!
//! Every knob has a default that reproduces the registry's long-standing
//! behaviour, so an empty or missing file is the normal case. The file
//! exists for hosts that need to tune limits or opt into the semantic
//! `latest` selection on create.
//!
//! ```toml
//! [readme]
//! max_len = 65536
//!
//! [publish]
//! private_prefix = "_"
//! default_tag = "latest"
//!
//! [create]
//! latest = "last-processed"
//!
//! [metadata]
//! copy_fields = ["description", "homepage", "keywords", "repository",
//!                "contributors", "author", "bugs", "license"]
//! legacy_time_fields = ["ctime", "mtime"]
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
#[derive(Default)]
pub struct EngineConfig {
    /// Readme consolidation settings.
    #[serde(default)]
    pub readme: ReadmeConfig,

    /// Publish-path settings.
    #[serde(default)]
    pub publish: PublishConfig,

    /// Document-creation settings.
    #[serde(default)]
    pub create: CreateConfig,

    /// Root metadata normalisation settings.
    #[serde(default)]
    pub metadata: MetadataConfig,
}

// ---------------------------------------------------------------------------
// ReadmeConfig
// ---------------------------------------------------------------------------

/// Readme consolidation settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadmeConfig {
    /// Maximum readme length in characters; longer readmes are truncated.
    #[serde(default = "default_readme_max_len")]
    pub max_len: usize,
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            max_len: default_readme_max_len(),
        }
    }
}

const fn default_readme_max_len() -> usize {
    64 * 1024
}

// ---------------------------------------------------------------------------
// PublishConfig
// ---------------------------------------------------------------------------

/// Settings applied when a new version is added.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublishConfig {
    /// `publishConfig` keys starting with this prefix are stripped.
    #[serde(default = "default_private_prefix")]
    pub private_prefix: String,

    /// Tag used when the request names none.
    #[serde(default = "default_tag")]
    pub default_tag: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            private_prefix: default_private_prefix(),
            default_tag: default_tag(),
        }
    }
}

fn default_private_prefix() -> String {
    "_".to_owned()
}

fn default_tag() -> String {
    crate::model::document::LATEST.to_owned()
}

// ---------------------------------------------------------------------------
// CreateConfig
// ---------------------------------------------------------------------------

/// Settings for the first write of a document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateConfig {
    /// How `dist-tags.latest` is chosen from the submitted versions.
    #[serde(default)]
    pub latest: LatestSelection,
}

/// Policy for picking `latest` when a document is created with versions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LatestSelection {
    /// The last key of the submitted `versions` map, in submission order.
    #[default]
    LastProcessed,
    /// The key with the highest version precedence.
    Highest,
}

impl fmt::Display for LatestSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastProcessed => write!(f, "last-processed"),
            Self::Highest => write!(f, "highest"),
        }
    }
}

// ---------------------------------------------------------------------------
// MetadataConfig
// ---------------------------------------------------------------------------

/// Root metadata normalisation settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataConfig {
    /// Fields copied from the `latest` version onto the document root.
    #[serde(default = "default_copy_fields")]
    pub copy_fields: Vec<String>,

    /// Obsolete timestamp fields removed from the root and every version.
    #[serde(default = "default_legacy_time_fields")]
    pub legacy_time_fields: Vec<String>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            copy_fields: default_copy_fields(),
            legacy_time_fields: default_legacy_time_fields(),
        }
    }
}

fn default_copy_fields() -> Vec<String> {
    [
        "description",
        "homepage",
        "keywords",
        "repository",
        "contributors",
        "author",
        "bugs",
        "license",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

fn default_legacy_time_fields() -> Vec<String> {
    vec!["ctime".to_owned(), "mtime".to_owned()]
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// An engine config file that could not be used.
#[derive(Debug, thiserror::Error)]
#[error("{}{detail}", .path.as_ref().map(|p| format!("{}: ", p.display())).unwrap_or_default())]
pub struct ConfigError {
    /// File the config came from, when loaded from disk.
    pub path: Option<std::path::PathBuf>,
    /// What is wrong, prefixed with the TOML line when known.
    pub detail: String,
}

impl EngineConfig {
    /// Read the engine config at `path`.
    ///
    /// A missing file yields [`EngineConfig::default`], so hosts can ship
    /// without one.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file exists but cannot be read or does
    /// not describe a valid config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    detail: format!("unreadable engine config: {e}"),
                });
            }
        };
        Self::parse(&text).map_err(|e| ConfigError {
            path: Some(path.to_owned()),
            ..e
        })
    }

    /// Build a config from TOML text.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for malformed TOML, unknown sections or keys,
    /// and values of the wrong type.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| {
            let line = e
                .span()
                .map(|span| text[..span.start].matches('\n').count() + 1);
            let detail = match line {
                Some(line) => format!("engine config line {line}: {}", e.message()),
                None => format!("engine config: {}", e.message()),
            };
            ConfigError { path: None, detail }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
