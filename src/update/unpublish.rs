//! Soft delete.
//!
//! Unpublish never removes data. It returns a trimmed patch carrying the
//! identity fields and a `time` map with the `unpublished` marker set. The
//! host store commits it as a partial write over the stored document (see
//! [`PackageDocument::overlay`]), so versions and maintainers stay in place
//! for a later publish to reactivate.

use crate::error::{UpdateError, ValidationError};
use crate::model::{Method, PackageDocument, Unpublished};

use super::Invocation;

/// Acknowledgement for a successful unpublish.
pub const MESSAGE: &str = "deleted";

/// Mark the stored document as unpublished.
///
/// # Errors
/// Returns [`UpdateError::MethodNotAllowed`] for any verb but `DELETE`,
/// checked before anything else, and a validation error if there is no
/// stored document.
pub fn unpublish(
    inv: &Invocation<'_>,
    stored: Option<PackageDocument>,
) -> Result<PackageDocument, UpdateError> {
    if inv.request.method != Method::Delete {
        return Err(UpdateError::MethodNotAllowed {
            method: inv.request.method.clone(),
        });
    }
    let Some(doc) = stored else {
        return Err(ValidationError::MissingDocument.into());
    };

    let mut time = doc.time.unwrap_or_default();
    time.unpublished = Some(Unpublished {
        name: inv.user().to_owned(),
        time: inv.now.clone(),
    });
    tracing::debug!(package = doc.id.as_deref(), "unpublishing");

    Ok(PackageDocument {
        name: doc.id.clone(),
        id: doc.id,
        rev: doc.rev,
        time: Some(time),
        ..PackageDocument::default()
    })
}
