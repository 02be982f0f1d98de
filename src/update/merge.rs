//! Full-document merge.
//!
//! A client may PUT a whole (or partial) document back. Additive changes are
//! always accepted. Destructive ones, replacing maintainers and pruning
//! versions, need the client to prove it saw the current revision by
//! sending the stored `_rev`. A stale or missing `_rev` quietly degrades the
//! request to an additive merge.
//!
//! Published version content is immutable. The only change allowed to an
//! existing version is its `deprecated` notice.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::{UpdateError, ValidationError};
use crate::model::document::is_truthy;
use crate::model::{PackageDocument, Versions};

use super::{Invocation, auxiliary, publish};

/// Merge a submitted document into the stored one.
///
/// # Errors
/// Returns a validation error for a non-object or undecodable body, or for a
/// bad new version, and a conflict error if an existing version's content
/// would change.
pub fn merge_document(
    inv: &Invocation<'_>,
    doc: &mut PackageDocument,
    body: Value,
) -> Result<(), UpdateError> {
    if !body.is_object() {
        return Err(ValidationError::NotAnObject.into());
    }
    let mut incoming: PackageDocument =
        serde_json::from_value(body).map_err(|e| ValidationError::Malformed {
            detail: e.to_string(),
        })?;

    let stored_rev = doc.rev.clone();
    if let Some(marker) = doc.time.as_mut().and_then(|t| t.unpublished.take()) {
        tracing::debug!(by = %marker.name, at = %marker.time, "reactivating unpublished package");
        incoming.rev.clone_from(&stored_rev);
    }
    let rev_match = incoming.rev.is_some() && incoming.rev == stored_rev;

    copy_scalars(doc, &mut incoming);

    if let Some(maintainers) = incoming.maintainers.take() {
        if rev_match {
            tracing::debug!(count = maintainers.len(), "replacing maintainers");
            doc.maintainers = Some(maintainers);
        } else {
            tracing::debug!("ignoring maintainers from a stale revision");
        }
    }

    if let Some(dist_tags) = incoming.dist_tags.take() {
        doc.dist_tags = Some(dist_tags);
    }

    merge_versions(inv, doc, incoming.versions.take(), rev_match)?;
    auxiliary::merge_users(doc, incoming.users.take(), inv.user());
    auxiliary::merge_attachments(doc, incoming.attachments.take());
    Ok(())
}

/// Overwrite every string-valued root field. `_rev` is never copied.
fn copy_scalars(doc: &mut PackageDocument, incoming: &mut PackageDocument) {
    overwrite(&mut doc.id, incoming.id.take());
    overwrite(&mut doc.name, incoming.name.take());
    overwrite(&mut doc.readme, incoming.readme.take());
    overwrite(&mut doc.readme_filename, incoming.readme_filename.take());

    for (key, value) in std::mem::take(&mut incoming.extra) {
        if value.is_string() {
            doc.extra.insert(key, value);
        }
    }
}

fn overwrite(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Merge submitted versions into the stored map.
///
/// With `rev_match`, stored versions the request does not mention are
/// removed afterwards.
///
/// # Errors
/// See [`merge_document`].
pub fn merge_versions(
    inv: &Invocation<'_>,
    doc: &mut PackageDocument,
    incoming: Option<Versions>,
    rev_match: bool,
) -> Result<(), UpdateError> {
    let Some(incoming) = incoming else {
        return Ok(());
    };
    let mentioned: HashSet<String> = incoming.keys().cloned().collect();

    for (key, mut submitted) in incoming {
        let Some(existing) = doc.versions_mut().get_mut(&key) else {
            if inv.scheme.clean(&key).as_deref() != Some(key.as_str()) {
                return Err(ValidationError::NonCanonicalVersion { version: key }.into());
            }
            publish::add_record(inv, doc, &key, submitted)?;
            continue;
        };

        // `directories: {}` and no `directories` are the same thing.
        let existing_has_directories = existing.directories.as_ref().is_some_and(is_truthy);
        if !existing_has_directories && submitted.has_empty_directories() {
            submitted.directories = None;
        }

        if submitted.is_deprecated() {
            tracing::debug!(version = %key, "updating deprecation notice");
            existing.deprecated = submitted.deprecated;
        } else if submitted != *existing {
            let old = existing.to_json();
            let new = submitted.to_json();
            tracing::debug!(version = %key, old = %old, new = %new, "published version differs");
            return Err(UpdateError::Conflict {
                version: key,
                old,
                new,
            });
        }
    }

    if rev_match {
        let versions = doc.versions_mut();
        let before = versions.len();
        versions.retain(|key, _| mentioned.contains(key));
        let pruned = before - versions.len();
        if pruned > 0 {
            tracing::debug!(pruned, "pruned versions missing from request");
        }
    }
    Ok(())
}
