//! Request classification.
//!
//! Picks exactly one handler per request from two facts: whether the store
//! already holds a document, and the shape of the request.
//!
//! | stored doc | addressed version | body       | route            |
//! |------------|-------------------|------------|------------------|
//! | none       | any               | any        | create           |
//! | present    | yes               | string     | tag assignment   |
//! | present    | yes               | non-string | add one version  |
//! | present    | no                | any        | full merge       |
//!
//! The stored document travels inside the route, so a handler that needs one
//! always has one.

use std::fmt;

use serde_json::Value;

use crate::error::ValidationError;
use crate::model::{PackageDocument, Query};

/// The handler selected for a request, with everything it consumes.
#[derive(Clone, Debug, PartialEq)]
pub enum Route {
    /// No stored document: the body becomes the new document.
    Create {
        /// Candidate document body.
        body: Value,
    },
    /// A stored document exists and `op` says what to do with it.
    Existing {
        /// The stored document.
        doc: Box<PackageDocument>,
        /// The requested operation.
        op: Operation,
    },
}

/// What to do with an existing document.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    /// Point `tag` at `version`.
    AssignTag {
        /// Tag name (from the request address).
        tag: String,
        /// Version string (the request body).
        version: String,
    },
    /// Add one brand-new version.
    AddVersion {
        /// Addressed version.
        version: String,
        /// Version record body.
        body: Value,
    },
    /// Merge a client-submitted document into the stored one.
    MergeDocument {
        /// Submitted document body.
        body: Value,
    },
}

impl Route {
    /// Fieldless name of the route.
    #[must_use]
    pub const fn kind(&self) -> RouteKind {
        match self {
            Self::Create { .. } => RouteKind::Create,
            Self::Existing { op, .. } => match op {
                Operation::AssignTag { .. } => RouteKind::TagAssignment,
                Operation::AddVersion { .. } => RouteKind::AddVersion,
                Operation::MergeDocument { .. } => RouteKind::FullMerge,
            },
        }
    }
}

/// Fieldless route name, for logs and results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RouteKind {
    /// First write of a document.
    Create,
    /// Dist-tag update.
    TagAssignment,
    /// Single new version.
    AddVersion,
    /// Whole-document merge.
    FullMerge,
    /// Soft delete.
    Unpublish,
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::TagAssignment => write!(f, "tag-assignment"),
            Self::AddVersion => write!(f, "add-version"),
            Self::FullMerge => write!(f, "full-merge"),
            Self::Unpublish => write!(f, "unpublish"),
        }
    }
}

/// Parse the raw request body as JSON.
///
/// # Errors
/// Returns [`ValidationError::InvalidJson`] if the body is not JSON.
pub fn parse_body(raw: &str) -> Result<Value, ValidationError> {
    serde_json::from_str(raw).map_err(|e| ValidationError::InvalidJson {
        detail: e.to_string(),
    })
}

/// Select the route for a request.
#[must_use]
pub fn classify(stored: Option<PackageDocument>, query: &Query, body: Value) -> Route {
    let Some(doc) = stored else {
        return Route::Create { body };
    };
    let doc = Box::new(doc);

    let op = match (query.target(), body) {
        (Some(tag), Value::String(version)) => Operation::AssignTag {
            tag: tag.to_owned(),
            version,
        },
        (Some(version), body) => Operation::AddVersion {
            version: version.to_owned(),
            body,
        },
        (None, body) => Operation::MergeDocument { body },
    };
    Route::Existing { doc, op }
}
