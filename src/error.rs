//! Error types for package-document updates.
//!
//! [`UpdateError`] is the single error type returned by every update handler.
//! Its `Display` output is the `forbidden` reason surfaced verbatim to the
//! client, so the wording here is part of the wire contract: existing
//! clients match on several of these strings.
//!
//! Every error is terminal for the invocation. No handler returns a partial
//! document alongside an error.

use std::fmt;

use thiserror::Error;

use crate::model::request::Method;

// ---------------------------------------------------------------------------
// UpdateError
// ---------------------------------------------------------------------------

/// Why an update was rejected.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The unpublish path was reached with a verb other than `DELETE`.
    #[error("Method not allowed")]
    MethodNotAllowed {
        /// The verb the request actually used.
        method: Method,
    },

    /// The request is malformed or violates a document rule.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request tried to change the content of a published version.
    #[error("Document Update Conflict: cannot modify pre-existing version: {version}\nold={old}\nnew={new}")]
    Conflict {
        /// The version key that was targeted.
        version: String,
        /// Stored record, as JSON.
        old: String,
        /// Submitted record, as JSON.
        new: String,
    },

    /// The merged document is structurally broken (no maintainers).
    #[error("no maintainers?\n{document}")]
    Integrity {
        /// The offending document, as JSON.
        document: String,
    },
}

impl UpdateError {
    /// The error class, for hosts that branch on it.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MethodNotAllowed { .. } => ErrorKind::MethodNotAllowed,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Integrity { .. } => ErrorKind::Integrity,
        }
    }
}

/// Fieldless classification of [`UpdateError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong verb for the unpublish path.
    MethodNotAllowed,
    /// Malformed or rule-violating input.
    Validation,
    /// Attempted mutation of a published version.
    Conflict,
    /// Broken document invariant.
    Integrity,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MethodNotAllowed => write!(f, "method-not-allowed"),
            Self::Validation => write!(f, "validation"),
            Self::Conflict => write!(f, "conflict"),
            Self::Integrity => write!(f, "integrity"),
        }
    }
}

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// A validation failure. Each variant renders one fixed client-facing message.
///
/// Quoted values are rendered as JSON string literals, matching what existing
/// clients already parse.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The request body is not JSON.
    #[error("invalid JSON body: {detail}")]
    InvalidJson {
        /// Parser message.
        detail: String,
    },

    /// The body parsed, but is not a JSON object where one is required.
    #[error("request body must be a JSON object")]
    NotAnObject,

    /// The body is an object, but does not fit the document or record model.
    #[error("invalid document: {detail}")]
    Malformed {
        /// Decoder message.
        detail: String,
    },

    /// A version key in a newly created document is not a valid version.
    #[error("Invalid version: {}", quote(.version))]
    CreateInvalidVersion {
        /// The rejected key.
        version: String,
    },

    /// A version record's `version` field disagrees with its key.
    #[error("Version mismatch: {} !== {}", quote(.key), quote_opt(.record))]
    VersionMismatch {
        /// Key in the `versions` map.
        key: String,
        /// The record's own `version` field.
        record: Option<String>,
    },

    /// A package name failed the name rules.
    #[error("Invalid name: {}", quote_opt(.name))]
    InvalidName {
        /// The rejected name (`None` when absent).
        name: Option<String>,
    },

    /// A tag was pointed at a string that is not a version.
    #[error("setting tag {tag} to invalid version: {version}")]
    TagInvalidVersion {
        /// Tag being set.
        tag: String,
        /// Rejected version string.
        version: String,
    },

    /// A tag was pointed at a version the document does not contain.
    #[error("setting tag {tag} to unknown version: {version}")]
    TagUnknownVersion {
        /// Tag being set.
        tag: String,
        /// Version that is not in `versions`.
        version: String,
    },

    /// A single-version publish body is not an object.
    #[error("putting invalid object to version {version}")]
    NotAVersionObject {
        /// Target version from the request address.
        version: String,
    },

    /// A publish target is not a valid version.
    #[error("invalid version: {version}")]
    PublishInvalidVersion {
        /// The rejected target.
        version: String,
    },

    /// A publish targeted a version that already exists.
    #[error("cannot modify existing version")]
    VersionExists {
        /// The existing version.
        version: String,
    },

    /// The record's version and the addressed version differ after cleaning.
    #[error(
        "version in doc doesn't match version in request: {} !== {}",
        quote_opt(.record),
        quote(.target)
    )]
    PublishVersionMismatch {
        /// Canonical form of the record's `version` (`None` if invalid).
        record: Option<String>,
        /// Canonical form of the addressed version.
        target: String,
    },

    /// A merged-in version key is not already in canonical form.
    #[error("Invalid version: {version}")]
    NonCanonicalVersion {
        /// The rejected key.
        version: String,
    },

    /// Unpublish was requested for a document the store does not have.
    #[error("cannot unpublish a package that does not exist")]
    MissingDocument,
}

fn quote(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

#[allow(clippy::ref_option)]
fn quote_opt(s: &Option<String>) -> String {
    s.as_deref().map_or_else(|| "undefined".to_owned(), quote)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
