//! End-to-end behaviour of the update and unpublish entry points.

#![allow(clippy::unwrap_used)]

mod common;

use common::{
    NOW, REV, engine, engine_with, maintainers, put, stored_doc, stored_json, stored_version,
    version_body, version_keys,
};
use regdoc::model::{Person, Unpublished};
use regdoc::{
    EngineConfig, ErrorKind, LatestSelection, Persist, Response, RouteKind, UpdateRequest,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Published versions are immutable
// ---------------------------------------------------------------------------

#[test]
fn changing_a_published_version_is_a_conflict() {
    let stored = stored_doc();
    let mut tampered = stored_version("mypkg", "1.0.0");
    tampered["dist"]["shasum"] = json!("evil");

    let err = engine()
        .update(Some(stored.clone()), &put(&json!({ "_rev": REV, "versions": { "1.0.0": tampered } })))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("cannot modify pre-existing version: 1.0.0"));
    assert_eq!(stored, stored_doc());
}

#[test]
fn identical_republish_only_touches_bookkeeping() {
    let stored = stored_doc();
    let body = json!({
        "_rev": "1-stale",
        "versions": {
            "1.0.0": stored_version("mypkg", "1.0.0"),
            "1.1.0": stored_version("mypkg", "1.1.0")
        }
    });

    let update = engine().update(Some(stored.clone()), &put(&body)).unwrap();

    let mut expected = stored;
    expected.time_mut().modified = Some(NOW.to_owned());
    assert_eq!(update.document, expected);
    assert_eq!(update.message, "updated package");
    assert_eq!(update.route, RouteKind::FullMerge);
}

#[test]
fn deprecation_overrides_otherwise_different_content() {
    let body = json!({ "versions": { "1.0.0": { "deprecated": "use 1.1.0" } } });

    let update = engine().update(Some(stored_doc()), &put(&body)).unwrap();

    let versions = update.document.versions.unwrap();
    let rec = versions.get("1.0.0").unwrap();
    assert_eq!(rec.deprecated.as_deref(), Some("use 1.1.0"));
    assert_eq!(rec.extra.get("dist"), stored_version("mypkg", "1.0.0").get("dist"));
    assert_eq!(rec.name.as_deref(), Some("mypkg"));
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[test]
fn publish_without_any_tag_moves_latest() {
    let request = put(&version_body("mypkg", "2.0.0")).with_version("2.0.0");

    let update = engine().update(Some(stored_doc()), &request).unwrap();

    assert_eq!(update.message, "added version");
    assert_eq!(update.route, RouteKind::AddVersion);
    assert_eq!(update.document.latest_tag(), Some("2.0.0"));
    assert_eq!(update.document.extra.get("description"), Some(&json!("A package")));
}

#[test]
fn publish_with_body_tag_leaves_existing_latest() {
    let mut body = version_body("mypkg", "2.0.0-beta.1");
    body["tag"] = json!("beta");
    let request = put(&body).with_version("2.0.0-beta.1");

    let update = engine().update(Some(stored_doc()), &request).unwrap();

    let tags = update.document.dist_tags.unwrap();
    assert_eq!(tags.get("beta").map(String::as_str), Some("2.0.0-beta.1"));
    assert_eq!(tags.get("latest").map(String::as_str), Some("1.1.0"));
}

#[test]
fn publish_with_body_tag_fills_missing_latest() {
    let mut stored = stored_json();
    stored["dist-tags"] = json!({});
    let mut body = version_body("mypkg", "2.0.0-beta.1");
    body["tag"] = json!("beta");
    let request = put(&body).with_version("2.0.0-beta.1");

    let update = engine()
        .update(Some(serde_json::from_value(stored).unwrap()), &request)
        .unwrap();

    let tags = update.document.dist_tags.unwrap();
    assert_eq!(tags.get("beta").map(String::as_str), Some("2.0.0-beta.1"));
    assert_eq!(tags.get("latest").map(String::as_str), Some("2.0.0-beta.1"));
}

#[test]
fn query_tag_beats_publish_config_tag() {
    let mut body = version_body("mypkg", "2.0.0");
    body["publishConfig"] = json!({ "tag": "next", "_auth": "secret" });
    let request = put(&body).with_version("2.0.0").with_tag("canary");

    let update = engine().update(Some(stored_doc()), &request).unwrap();

    let tags = update.document.dist_tags.as_ref().unwrap();
    assert_eq!(tags.get("canary").map(String::as_str), Some("2.0.0"));
    assert!(!tags.contains_key("next"));
    let rec = update.document.versions.as_ref().unwrap().get("2.0.0").unwrap();
    assert_eq!(rec.publish_config, json!({ "tag": "next" }).as_object().cloned());
}

#[test]
fn tagging_an_existing_version() {
    let request = UpdateRequest::put("alice", r#""1.0.0""#).with_version("stable");

    let update = engine().update(Some(stored_doc()), &request).unwrap();

    assert_eq!(update.message, "updated tag");
    assert_eq!(update.route, RouteKind::TagAssignment);
    let tags = update.document.dist_tags.unwrap();
    assert_eq!(tags.get("stable").map(String::as_str), Some("1.0.0"));
    assert_eq!(tags.get("latest").map(String::as_str), Some("1.1.0"));
}

#[test]
fn tagging_an_unknown_version_is_rejected() {
    let request = UpdateRequest::put("alice", r#""9.9.9""#).with_version("next");

    let result = engine().update(Some(stored_doc()), &request);

    let response = Response::from_result(result);
    assert!(response.is_error());
    assert_eq!(
        response.message,
        r#"{"forbidden":"setting tag next to unknown version: 9.9.9"}"#
    );
    assert_eq!(response.doc, Persist::Error(regdoc::response::ErrorMarker::new(
        "setting tag next to unknown version: 9.9.9"
    )));
}

// ---------------------------------------------------------------------------
// Readme
// ---------------------------------------------------------------------------

#[test]
fn oversized_readme_is_cut_to_64_kib() {
    let mut body = version_body("mypkg", "2.0.0");
    body["readme"] = json!("r".repeat(70_000));
    body["readmeFilename"] = json!("README.md");
    let request = put(&body).with_version("2.0.0");

    let update = engine().update(Some(stored_doc()), &request).unwrap();

    let readme = update.document.readme.unwrap();
    assert_eq!(readme.chars().count(), 65_536);
    let rec = update.document.versions.as_ref().unwrap().get("2.0.0").unwrap();
    assert!(rec.readme.is_none());
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

#[test]
fn stale_revision_never_prunes() {
    let body = json!({
        "_rev": "2-old",
        "versions": { "1.1.0": stored_version("mypkg", "1.1.0") }
    });

    let update = engine().update(Some(stored_doc()), &put(&body)).unwrap();

    assert_eq!(version_keys(&update.document), ["1.0.0", "1.1.0"]);
    assert_eq!(update.document.rev.as_deref(), Some(REV));
}

#[test]
fn matching_revision_prunes_unmentioned_versions() {
    let body = json!({
        "_rev": REV,
        "versions": { "1.1.0": stored_version("mypkg", "1.1.0") }
    });

    let update = engine().update(Some(stored_doc()), &put(&body)).unwrap();

    assert_eq!(version_keys(&update.document), ["1.1.0"]);
}

// ---------------------------------------------------------------------------
// Unpublish
// ---------------------------------------------------------------------------

#[test]
fn unpublish_sets_marker_on_trimmed_patch() {
    let update = engine()
        .unpublish(Some(stored_doc()), &UpdateRequest::delete("alice"))
        .unwrap();

    assert_eq!(update.message, "deleted");
    assert_eq!(update.route, RouteKind::Unpublish);
    let doc = &update.document;
    assert_eq!(doc.id.as_deref(), Some("mypkg"));
    assert_eq!(doc.rev.as_deref(), Some(REV));
    assert_eq!(doc.name.as_deref(), Some("mypkg"));
    assert!(doc.versions.is_none());
    assert!(doc.maintainers.is_none());
    assert_eq!(
        doc.time.as_ref().and_then(|t| t.unpublished.clone()),
        Some(Unpublished {
            name: "alice".to_owned(),
            time: NOW.to_owned(),
        })
    );
    assert_eq!(
        Response::success(update).message,
        r#"{"ok":"deleted"}"#
    );
}

#[test]
fn unpublish_rejects_other_verbs() {
    let request = UpdateRequest::delete("alice").with_method(regdoc::Method::Put);
    let response = Response::from_result(engine().unpublish(Some(stored_doc()), &request));
    assert!(response.is_error());
    assert_eq!(response.message, r#"{"error":"method not allowed"}"#);
}

#[test]
fn publish_after_unpublish_clears_marker() {
    let patch = engine()
        .unpublish(Some(stored_doc()), &UpdateRequest::delete("bob"))
        .unwrap()
        .document;
    let mut stored = stored_doc();
    stored.overlay(patch);
    assert!(stored.is_unpublished());
    let request = put(&version_body("mypkg", "2.0.0")).with_version("2.0.0");

    let update = engine().update(Some(stored), &request).unwrap();

    let doc = update.document;
    assert_eq!(update.message, "added version");
    assert!(!doc.is_unpublished());
    assert_eq!(doc.rev.as_deref(), Some(REV));
    assert_eq!(version_keys(&doc), ["1.0.0", "1.1.0", "2.0.0"]);
    assert_eq!(doc.latest_tag(), Some("2.0.0"));
    let alice = Person {
        email: Some("alice@example.com".to_owned()),
        ..Person::named("alice")
    };
    assert_eq!(doc.maintainers, Some(vec![alice]));
}

#[test]
fn republish_over_unpublished_document_adopts_stored_revision() {
    let patch = engine()
        .unpublish(Some(stored_doc()), &UpdateRequest::delete("alice"))
        .unwrap()
        .document;
    let mut stored = stored_doc();
    stored.overlay(patch);
    let body = json!({
        "_id": "mypkg",
        "name": "mypkg",
        "maintainers": [{ "name": "bob" }],
        "dist-tags": { "latest": "3.0.0" },
        "versions": { "3.0.0": version_body("mypkg", "3.0.0") }
    });

    let update = engine().update(Some(stored), &put(&body)).unwrap();

    let doc = update.document;
    assert!(!doc.is_unpublished());
    assert_eq!(doc.rev.as_deref(), Some(REV));
    assert_eq!(doc.maintainers, Some(vec![Person::named("bob")]));
    assert_eq!(version_keys(&doc), ["3.0.0"]);
    assert_eq!(doc.latest_tag(), Some("3.0.0"));
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_builds_a_complete_document() {
    let body = json!({
        "name": "newpkg",
        "maintainers": maintainers(),
        "versions": {
            "1.0.0": version_body("newpkg", "1.0.0"),
            "0.9.0": version_body("newpkg", "0.9.0")
        }
    });

    let update = engine().update(None, &put(&body)).unwrap();

    assert_eq!(update.message, "created new entry");
    assert_eq!(update.route, RouteKind::Create);
    let doc = update.document;
    assert_eq!(doc.id.as_deref(), Some("newpkg"));
    assert_eq!(doc.latest_tag(), Some("0.9.0"));
    let time = doc.time.as_ref().unwrap();
    assert_eq!(time.created.as_deref(), Some(NOW));
    assert_eq!(time.versions.get("1.0.0").map(String::as_str), Some(NOW));
    assert_eq!(doc.readme.as_deref(), Some(""));
    assert_eq!(doc.extra.get("description"), Some(&json!("A package")));
}

#[test]
fn create_with_highest_latest_policy() {
    let mut config = EngineConfig::default();
    config.create.latest = LatestSelection::Highest;
    let body = json!({
        "name": "newpkg",
        "maintainers": maintainers(),
        "versions": {
            "1.0.0": version_body("newpkg", "1.0.0"),
            "0.9.0": version_body("newpkg", "0.9.0")
        }
    });

    let update = engine_with(config).update(None, &put(&body)).unwrap();

    assert_eq!(update.document.latest_tag(), Some("1.0.0"));
}

#[test]
fn create_without_maintainers_fails_integrity() {
    let err = engine()
        .update(None, &put(&json!({ "name": "newpkg" })))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
}

#[test]
fn body_that_is_not_json_is_rejected() {
    let request = UpdateRequest::put("alice", "{nope");
    let err = engine().update(Some(stored_doc()), &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().starts_with("invalid JSON body: "));
}

// ---------------------------------------------------------------------------
// Users and attachments
// ---------------------------------------------------------------------------

#[test]
fn users_merge_only_touches_requester() {
    let mut stored = stored_json();
    stored["users"] = json!({ "carol": true });
    let body = json!({ "users": { "alice": true, "carol": false, "bob": true } });

    let update = engine()
        .update(Some(serde_json::from_value(stored).unwrap()), &put(&body))
        .unwrap();

    assert_eq!(
        update.document.users.map(serde_json::Value::Object),
        Some(json!({ "carol": true, "alice": true }))
    );
}

#[test]
fn inline_attachments_merge_and_stubs_do_not() {
    let body = json!({
        "_attachments": {
            "mypkg-2.0.0.tgz": { "content_type": "application/octet-stream", "data": "H4sI", "length": 3 },
            "mypkg-1.0.0.tgz": { "stub": true }
        }
    });

    let update = engine().update(Some(stored_doc()), &put(&body)).unwrap();

    let attachments = update.document.attachments.unwrap();
    assert_eq!(attachments.keys().collect::<Vec<_>>(), ["mypkg-2.0.0.tgz"]);
}

// ---------------------------------------------------------------------------
// Determinism and the host contract
// ---------------------------------------------------------------------------

#[test]
fn same_inputs_give_same_outputs() {
    let request = put(&version_body("mypkg", "2.0.0")).with_version("2.0.0");
    let a = engine().update(Some(stored_doc()), &request).unwrap();
    let b = engine().update(Some(stored_doc()), &request).unwrap();
    assert_eq!(a, b);
}

#[test]
fn rejected_update_yields_error_marker() {
    let request = put(&version_body("mypkg", "1.0.0")).with_version("1.0.0");
    let response = Response::from_result(engine().update(Some(stored_doc()), &request));
    match &response.doc {
        Persist::Error(marker) => {
            assert_eq!(marker.id, ".error.");
            assert_eq!(marker.forbidden, "cannot modify existing version");
        }
        Persist::Document(doc) => panic!("expected error marker, got {doc:?}"),
    }
}
