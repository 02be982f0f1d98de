//! Adding a brand-new version.
//!
//! [`add_record`] is shared by the single-version route and by the version
//! merge, which hands every version the stored document lacks to it.

use serde_json::Value;

use crate::error::{UpdateError, ValidationError};
use crate::model::{PackageDocument, Person, VersionRecord};
use crate::version::Strictness;

use super::Invocation;
use super::tags;

/// Handle a single-version publish addressed to `version`.
///
/// Publishing into an unpublished document reactivates it.
///
/// # Errors
/// Returns a validation error if the body is not a version object, or any
/// error from [`add_record`].
pub fn publish(
    inv: &Invocation<'_>,
    doc: &mut PackageDocument,
    version: &str,
    body: Value,
) -> Result<(), UpdateError> {
    if !body.is_object() {
        return Err(ValidationError::NotAVersionObject {
            version: version.to_owned(),
        }
        .into());
    }
    let record: VersionRecord =
        serde_json::from_value(body).map_err(|e| ValidationError::Malformed {
            detail: e.to_string(),
        })?;

    if let Some(marker) = doc.time.as_mut().and_then(|t| t.unpublished.take()) {
        tracing::debug!(by = %marker.name, at = %marker.time, "reactivating unpublished package");
    }

    add_record(inv, doc, version, record)
}

/// Validate `record` as a new version `target` and store it.
///
/// The stored record gets its `_id`, a maintainer snapshot and a publisher,
/// loses private `publishConfig` keys, and is tagged. It is keyed by the
/// canonical version, with a publish time of now.
///
/// # Errors
/// Returns a validation error if `target` is invalid or already present, if
/// the record's name does not match the document, or if the record's version
/// disagrees with `target`.
pub fn add_record(
    inv: &Invocation<'_>,
    doc: &mut PackageDocument,
    target: &str,
    mut record: VersionRecord,
) -> Result<(), UpdateError> {
    if !inv.scheme.is_valid(target, Strictness::Loose) {
        return Err(ValidationError::PublishInvalidVersion {
            version: target.to_owned(),
        }
        .into());
    }
    let Some(version) = inv.scheme.clean(target) else {
        return Err(ValidationError::PublishInvalidVersion {
            version: target.to_owned(),
        }
        .into());
    };

    if doc.has_version(target) || doc.has_version(&version) {
        return Err(ValidationError::VersionExists { version }.into());
    }

    let name_matches = record.name.is_some()
        && record.name.as_deref() == doc.name.as_deref()
        && record.name.as_deref() == doc.id.as_deref();
    if !name_matches {
        return Err(ValidationError::InvalidName { name: record.name }.into());
    }

    let record_version = record.version.as_deref().and_then(|v| inv.scheme.clean(v));
    if record_version.as_deref() != Some(version.as_str()) {
        return Err(ValidationError::PublishVersionMismatch {
            record: record_version,
            target: version,
        }
        .into());
    }

    let name = record.name.as_deref().unwrap_or_default();
    record.id = Some(format!("{name}@{version}"));
    record.version = Some(version.clone());
    record.maintainers.clone_from(&doc.maintainers);
    if record.publisher.is_none() {
        record.publisher = Some(Person::named(inv.user()));
    }
    record.strip_private_publish_config(&inv.config.publish.private_prefix);

    let tag = tags::resolve_publish_tag(
        &inv.request.query,
        &record,
        &inv.config.publish.default_tag,
    )
    .to_owned();
    tags::apply_publish_tags(doc, &tag, &version, inv.request.query.pre);

    tracing::debug!(version = %version, tag = %tag, "adding version");
    doc.versions_mut().insert(version.clone(), record);
    doc.time_mut().versions.insert(version, inv.now.clone());
    Ok(())
}
