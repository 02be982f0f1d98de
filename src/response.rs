//! The `(document, message)` pair handed back to the host store.
//!
//! A rejected update still produces a document: the error marker, whose
//! reserved `_id` the store's validation refuses to persist. The `message`
//! is a JSON string the host relays to the client unchanged.

use serde::Serialize;
use serde_json::json;

use crate::error::UpdateError;
use crate::model::PackageDocument;
use crate::update::Update;

/// Reserved `_id` of the error marker document.
pub const ERROR_ID: &str = ".error.";

/// Document returned in place of a real one when an update is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorMarker {
    /// Always [`ERROR_ID`].
    #[serde(rename = "_id")]
    pub id: String,
    /// Rejection reason.
    pub forbidden: String,
}

impl ErrorMarker {
    /// A marker carrying `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            id: ERROR_ID.to_owned(),
            forbidden: reason.into(),
        }
    }
}

/// What the host should write.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Persist {
    /// The new document state.
    Document(Box<PackageDocument>),
    /// The error marker. Must never be stored.
    Error(ErrorMarker),
}

impl Persist {
    /// Returns `true` for the error marker.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Host-facing result of one invocation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Response {
    /// Document to persist (or the error marker).
    pub doc: Persist,
    /// JSON-encoded acknowledgement or rejection.
    pub message: String,
}

impl Response {
    /// Wrap an engine result.
    #[must_use]
    pub fn from_result(result: Result<Update, UpdateError>) -> Self {
        match result {
            Ok(update) => Self::success(update),
            Err(e) => Self::failure(&e),
        }
    }

    /// `{"ok": <message>}` with the updated document.
    #[must_use]
    pub fn success(update: Update) -> Self {
        Self {
            doc: Persist::Document(Box::new(update.document)),
            message: json!({ "ok": update.message }).to_string(),
        }
    }

    /// The error marker with `{"forbidden": <reason>}`.
    ///
    /// A wrong unpublish verb answers `{"error": "method not allowed"}`
    /// instead, which older clients key on.
    #[must_use]
    pub fn failure(error: &UpdateError) -> Self {
        let reason = error.to_string();
        let message = match error {
            UpdateError::MethodNotAllowed { .. } => json!({ "error": "method not allowed" }),
            _ => json!({ "forbidden": reason }),
        };
        Self {
            doc: Persist::Error(ErrorMarker::new(reason)),
            message: message.to_string(),
        }
    }

    /// Returns `true` if the update was rejected.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.doc.is_error()
    }
}

/// Returns `true` if a raw document carries the reserved error `_id`.
///
/// Hosts check this before committing. The binary derives its exit status
/// from it.
#[must_use]
pub fn is_error_document(doc: &serde_json::Value) -> bool {
    doc.get("_id").and_then(serde_json::Value::as_str) == Some(ERROR_ID)
}
