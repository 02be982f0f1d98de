//! Shared test helpers for regdoc integration tests.
//!
//! Every engine built here runs on a fixed clock, so expected documents can
//! spell out timestamps exactly.

#![allow(dead_code, clippy::unwrap_used)]

use std::path::Path;
use std::process::{Command, Output};

use regdoc::{Engine, EngineConfig, FixedClock, NpmSemver, PackageDocument, UpdateRequest};
use serde_json::{Value, json};

/// The instant every fixture engine reports.
pub const NOW: &str = "2026-06-01T10:00:00.000Z";

/// Revision of [`stored_doc`].
pub const REV: &str = "3-abc";

pub type TestEngine = Engine<FixedClock, NpmSemver>;

/// Engine with default config and the fixed clock.
pub fn engine() -> TestEngine {
    engine_with(EngineConfig::default())
}

/// Engine with `config` and the fixed clock.
pub fn engine_with(config: EngineConfig) -> TestEngine {
    Engine::with_parts(config, FixedClock::new(NOW), NpmSemver)
}

/// The maintainer list of every fixture.
pub fn maintainers() -> Value {
    json!([{ "name": "alice", "email": "alice@example.com" }])
}

/// A version record as a client would publish it.
pub fn version_body(name: &str, version: &str) -> Value {
    json!({
        "name": name,
        "version": version,
        "description": "A package",
        "dist": {
            "shasum": format!("sha-{version}"),
            "tarball": format!("https://registry.example/{name}/-/{name}-{version}.tgz")
        }
    })
}

/// A version record as it sits in a stored document.
pub fn stored_version(name: &str, version: &str) -> Value {
    let mut record = version_body(name, version);
    if let Some(map) = record.as_object_mut() {
        map.insert("_id".to_owned(), json!(format!("{name}@{version}")));
        map.insert("maintainers".to_owned(), maintainers());
        map.insert("_npmUser".to_owned(), json!({ "name": "alice" }));
    }
    record
}

/// `mypkg` with versions 1.0.0 and 1.1.0, already normalised.
pub fn stored_json() -> Value {
    json!({
        "_id": "mypkg",
        "_rev": REV,
        "name": "mypkg",
        "description": "A package",
        "maintainers": maintainers(),
        "dist-tags": { "latest": "1.1.0" },
        "versions": {
            "1.0.0": stored_version("mypkg", "1.0.0"),
            "1.1.0": stored_version("mypkg", "1.1.0")
        },
        "time": {
            "created": "2026-01-01T00:00:00.000Z",
            "modified": "2026-01-02T00:00:00.000Z",
            "1.0.0": "2026-01-01T00:00:00.000Z",
            "1.1.0": "2026-01-02T00:00:00.000Z"
        },
        "readme": "# mypkg",
        "readmeFilename": "README.md"
    })
}

pub fn stored_doc() -> PackageDocument {
    serde_json::from_value(stored_json()).unwrap()
}

/// A PUT by alice with `body` as JSON.
pub fn put(body: &Value) -> UpdateRequest {
    UpdateRequest::put("alice", body.to_string())
}

/// Version keys of `doc`, in order.
pub fn version_keys(doc: &PackageDocument) -> Vec<String> {
    doc.versions.iter().flat_map(|v| v.keys()).cloned().collect()
}

// ---------------------------------------------------------------------------
// Binary helpers
// ---------------------------------------------------------------------------

/// Run regdoc in `dir`.
pub fn regdoc_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_regdoc"))
        .args(args)
        .current_dir(dir)
        .env("REGDOC_LOG", "off")
        .env_remove("REGDOC_USER")
        .output()
        .expect("failed to execute regdoc")
}

/// Run regdoc and assert it succeeds. Returns stdout parsed as JSON.
pub fn regdoc_ok(dir: &Path, args: &[&str]) -> Value {
    let out = regdoc_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "regdoc {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    serde_json::from_str(&stdout).unwrap()
}

/// Run regdoc and assert it exits non-zero. Returns the raw output.
pub fn regdoc_fails(dir: &Path, args: &[&str]) -> Output {
    let out = regdoc_in(dir, args);
    assert!(
        !out.status.success(),
        "regdoc {} should have failed:\nstdout: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
    );
    out
}
