//! `regdoc update` and `regdoc unpublish`.
//!
//! Both read the stored document from a file (standing in for the host
//! store), run the engine once, and return the host-facing [`Response`].
//! I/O and argument problems are `anyhow` errors; a rejected update is not.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use regdoc::{Engine, EngineConfig, Method, PackageDocument, Response, UpdateRequest};

#[derive(Args)]
pub struct UpdateArgs {
    /// Stored document (JSON). Omit to create a new package.
    #[arg(long)]
    doc: Option<PathBuf>,

    /// Request body: a document, a version record, or a JSON version string.
    #[arg(long)]
    body: PathBuf,

    /// Version or tag the request is addressed to.
    #[arg(long)]
    version: Option<String>,

    /// Tag to apply to a newly published version.
    #[arg(long)]
    tag: Option<String>,

    /// Publish without moving any tag (except a missing `latest`).
    #[arg(long)]
    pre: bool,

    /// Verified identity of the requester.
    #[arg(long, env = "REGDOC_USER")]
    user: String,

    /// Engine configuration (TOML). A missing file means defaults.
    #[arg(long, default_value = "regdoc.toml")]
    config: PathBuf,
}

#[derive(Args)]
pub struct UnpublishArgs {
    /// Stored document (JSON).
    #[arg(long)]
    doc: PathBuf,

    /// Verified identity of the requester.
    #[arg(long, env = "REGDOC_USER")]
    user: String,

    /// HTTP verb of the request. Anything but DELETE is refused.
    #[arg(long, default_value = "DELETE")]
    method: String,

    /// Engine configuration (TOML). A missing file means defaults.
    #[arg(long, default_value = "regdoc.toml")]
    config: PathBuf,
}

pub fn update(args: &UpdateArgs) -> Result<Response> {
    let engine = Engine::new(EngineConfig::load(&args.config)?);
    let stored = args.doc.as_deref().map(read_document).transpose()?;
    let body = std::fs::read_to_string(&args.body)
        .with_context(|| format!("Failed to read {}", args.body.display()))?;

    let mut request = UpdateRequest::put(&args.user, body);
    if let Some(version) = &args.version {
        request = request.with_version(version);
    }
    if let Some(tag) = &args.tag {
        request = request.with_tag(tag);
    }
    if args.pre {
        request = request.pre_release();
    }

    Ok(Response::from_result(engine.update(stored, &request)))
}

pub fn unpublish(args: &UnpublishArgs) -> Result<Response> {
    let engine = Engine::new(EngineConfig::load(&args.config)?);
    let stored = read_document(&args.doc)?;
    let method: Method = args.method.parse()?;
    let request = UpdateRequest::delete(&args.user).with_method(method);

    Ok(Response::from_result(engine.unpublish(Some(stored), &request)))
}

fn read_document(path: &Path) -> Result<PackageDocument> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
