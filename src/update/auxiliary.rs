//! User and attachment merges for the full-document route.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::model::document::is_truthy;
use crate::model::{Attachment, PackageDocument};

/// Merge the requester's own `users` entry.
///
/// Only `user`'s key is ever touched: a truthy incoming value replaces it,
/// anything else removes it. Entries of other identities are left alone
/// whatever the request says about them.
pub fn merge_users(doc: &mut PackageDocument, incoming: Option<Map<String, Value>>, user: &str) {
    let Some(mut incoming) = incoming else {
        return;
    };
    let users = doc.users.get_or_insert_with(Map::new);
    match incoming.shift_remove(user) {
        Some(value) if is_truthy(&value) => {
            users.insert(user.to_owned(), value);
        }
        _ => {
            users.shift_remove(user);
        }
    }
}

/// Merge attachments that carry inline data. Stubs are skipped.
pub fn merge_attachments(
    doc: &mut PackageDocument,
    incoming: Option<IndexMap<String, Attachment>>,
) {
    let Some(incoming) = incoming else {
        return;
    };
    let attachments = doc.attachments.get_or_insert_with(IndexMap::new);
    for (name, attachment) in incoming {
        if attachment.is_inline() {
            attachments.insert(name, attachment);
        } else {
            tracing::debug!(attachment = %name, "skipping stub attachment");
        }
    }
}
