//! Dist-tag management.
//!
//! Two writers touch `dist-tags`: an explicit tag assignment, and a publish
//! that tags its new version. Both keep `latest` present whenever the
//! document has versions.

use crate::error::{UpdateError, ValidationError};
use crate::model::document::LATEST;
use crate::model::{PackageDocument, Query, VersionRecord};
use crate::version::Strictness;

use super::Invocation;

/// Point `tag` at an existing `version`.
///
/// The version must be strictly valid and already present (as given) in
/// `versions`. The tag stores its canonical form.
///
/// # Errors
/// Returns a validation error for an invalid or unknown version.
pub fn assign(
    inv: &Invocation<'_>,
    doc: &mut PackageDocument,
    tag: &str,
    version: &str,
) -> Result<(), UpdateError> {
    if !inv.scheme.is_valid(version, Strictness::Strict) {
        return Err(ValidationError::TagInvalidVersion {
            tag: tag.to_owned(),
            version: version.to_owned(),
        }
        .into());
    }
    let canonical = match inv.scheme.clean(version) {
        Some(clean) if doc.has_version(version) => clean,
        _ => {
            return Err(ValidationError::TagUnknownVersion {
                tag: tag.to_owned(),
                version: version.to_owned(),
            }
            .into());
        }
    };

    tracing::debug!(tag, version = %canonical, "assigning dist-tag");
    doc.dist_tags_mut().insert(tag.to_owned(), canonical);
    Ok(())
}

/// The tag a publish applies to its new version.
///
/// Precedence: the request's `tag` parameter, then `publishConfig.tag`, then
/// the record's own `tag`, then `default_tag`.
#[must_use]
pub fn resolve_publish_tag<'a>(
    query: &'a Query,
    record: &'a VersionRecord,
    default_tag: &'a str,
) -> &'a str {
    query
        .explicit_tag()
        .or_else(|| record.publish_config_tag())
        .or_else(|| record.requested_tag())
        .unwrap_or(default_tag)
}

/// Tag a freshly published `version`.
///
/// Unless `skip` is set, `tag` moves to `version`. Independently, `latest`
/// is set to `version` if the document has no `latest` yet.
pub fn apply_publish_tags(doc: &mut PackageDocument, tag: &str, version: &str, skip: bool) {
    let dist_tags = doc.dist_tags_mut();
    if !skip {
        dist_tags.insert(tag.to_owned(), version.to_owned());
    }
    if !dist_tags.contains_key(LATEST) {
        dist_tags.insert(LATEST.to_owned(), version.to_owned());
    }
}
