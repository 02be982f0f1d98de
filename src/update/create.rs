//! First write of a package document.

use std::cmp::Ordering;

use serde_json::Value;

use crate::config::LatestSelection;
use crate::error::{UpdateError, ValidationError};
use crate::model::document::LATEST;
use crate::model::name::is_valid_package_name;
use crate::model::PackageDocument;
use crate::version::Strictness;

use super::Invocation;

/// Build a new document from the request body.
///
/// Every submitted version must have a valid key, a `version` field equal to
/// that key, and a valid package name. Any failure rejects the whole body.
///
/// # Errors
/// Returns a validation error for a non-object body, an undecodable body, or
/// any bad version entry.
pub fn create(inv: &Invocation<'_>, body: Value) -> Result<PackageDocument, UpdateError> {
    if !body.is_object() {
        return Err(ValidationError::NotAnObject.into());
    }
    let mut doc: PackageDocument =
        serde_json::from_value(body).map_err(|e| ValidationError::Malformed {
            detail: e.to_string(),
        })?;

    if doc.id.is_none() {
        doc.id.clone_from(&doc.name);
    }

    let mut latest: Option<String> = None;
    for (key, record) in doc.versions_mut().iter() {
        if !inv.scheme.is_valid(key, Strictness::Loose) {
            return Err(ValidationError::CreateInvalidVersion {
                version: key.clone(),
            }
            .into());
        }
        if record.version.as_deref() != Some(key.as_str()) {
            return Err(ValidationError::VersionMismatch {
                key: key.clone(),
                record: record.version.clone(),
            }
            .into());
        }
        if !record.name.as_deref().is_some_and(is_valid_package_name) {
            return Err(ValidationError::InvalidName {
                name: record.name.clone(),
            }
            .into());
        }

        let Some(clean) = inv.scheme.clean(key) else {
            continue;
        };
        latest = match (inv.config.create.latest, latest) {
            (LatestSelection::Highest, Some(best))
                if inv.scheme.compare(&best, &clean) != Some(Ordering::Less) =>
            {
                Some(best)
            }
            _ => Some(clean),
        };
    }

    let dist_tags = doc.dist_tags_mut();
    if let Some(latest) = latest {
        tracing::debug!(latest = %latest, policy = %inv.config.create.latest, "initial latest");
        dist_tags.insert(LATEST.to_owned(), latest);
    }

    Ok(doc)
}
