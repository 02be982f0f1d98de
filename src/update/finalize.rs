//! Normalisation applied to every successful update.
//!
//! Runs after the route handler, in a fixed order: legacy field cleanup,
//! timestamps, readme consolidation, `latest` copy-up, and finally the
//! maintainer integrity check.

use serde_json::Value;

use crate::error::UpdateError;
use crate::model::document::is_truthy;
use crate::model::{PackageDocument, TimeMap};

use super::{Invocation, integrity};

/// Normalise `doc` and check it is fit to store.
///
/// # Errors
/// Returns [`UpdateError::Integrity`] if the document ends up without
/// maintainers.
pub fn finalize(inv: &Invocation<'_>, mut doc: PackageDocument) -> Result<PackageDocument, UpdateError> {
    let metadata = &inv.config.metadata;
    strip_legacy_fields(&mut doc, &metadata.legacy_time_fields);
    stamp_times(&mut doc, &inv.now);
    consolidate_readme(&mut doc, inv.config.readme.max_len);
    copy_latest_fields(&mut doc, &metadata.copy_fields);
    integrity::check_maintainers(&doc)?;
    Ok(doc)
}

fn strip_legacy_fields(doc: &mut PackageDocument, fields: &[String]) {
    for field in fields {
        doc.extra.shift_remove(field);
    }
    for record in doc.versions.iter_mut().flat_map(|v| v.values_mut()) {
        for field in fields {
            record.extra.shift_remove(field);
        }
    }
}

/// Set `modified`, default `created`, and give every version a publish time.
fn stamp_times(doc: &mut PackageDocument, now: &str) {
    let PackageDocument { versions, time, .. } = doc;
    let time = time.get_or_insert_with(TimeMap::default);

    time.modified = Some(now.to_owned());
    if time.created.as_deref().is_none_or(str::is_empty) {
        time.created = Some(now.to_owned());
    }
    for key in versions.iter().flat_map(|v| v.keys()) {
        let entry = time.versions.entry(key.clone()).or_default();
        if entry.is_empty() {
            now.clone_into(entry);
        }
    }
}

/// Move the readme to the root and cap its length.
///
/// The `latest` version's readme wins. Failing that, the root keeps its own,
/// and failing that the first non-empty one in version order is used. The
/// filename is resolved the same way, independently. Versions never keep
/// their copies.
fn consolidate_readme(doc: &mut PackageDocument, max_len: usize) {
    let mut readme = doc.readme.take().unwrap_or_default();
    let mut filename = doc.readme_filename.take().unwrap_or_default();

    if let Some(latest) = doc.latest_record()
        && let Some(text) = latest.readme.as_deref().filter(|r| !r.is_empty())
    {
        text.clone_into(&mut readme);
        filename = latest.readme_filename.clone().unwrap_or_default();
    }

    for record in doc.versions.iter_mut().flat_map(|v| v.values_mut()) {
        let text = record.readme.take().unwrap_or_default();
        let name = record.readme_filename.take().unwrap_or_default();
        if readme.is_empty() {
            readme = text;
        }
        if filename.is_empty() {
            filename = name;
        }
    }

    if let Some((cut, _)) = readme.char_indices().nth(max_len) {
        tracing::debug!(max_len, "truncating readme");
        readme.truncate(cut);
    }
    doc.readme = Some(readme);
    doc.readme_filename = Some(filename);
}

/// Mirror descriptive fields of the `latest` version on the root.
fn copy_latest_fields(doc: &mut PackageDocument, fields: &[String]) {
    if doc.dist_tags.is_none() || doc.versions.is_none() {
        return;
    }
    let Some(latest) = doc.latest_record() else {
        return;
    };
    let values: Vec<(&String, Option<Value>)> = fields
        .iter()
        .map(|field| {
            let value = latest.extra.get(field).filter(|v| is_truthy(v)).cloned();
            (field, value)
        })
        .collect();

    for (field, value) in values {
        match value {
            Some(value) => {
                doc.extra.insert(field.clone(), value);
            }
            None => {
                doc.extra.shift_remove(field);
            }
        }
    }
}
