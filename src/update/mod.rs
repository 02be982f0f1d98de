//! Package document reconciliation.
//!
//! Implements the classify → handle → finalize pipeline that turns a stored
//! document (or none) plus one write request into the next document state:
//!
//! - **classify**: pick create, tag assignment, single-version add, or full
//!   merge from the stored document's presence and the request shape.
//! - **handle**: run the one handler that route selects. Handlers work on an
//!   owned copy of the stored document and bail out with `?` on the first
//!   problem, so a rejected request never yields a partial document.
//! - **finalize**: normalise timestamps, readme and root metadata, then run
//!   the maintainer integrity check.
//!
//! Unpublish is a separate entry point with its own, much smaller contract.
//!
//! # Determinism
//!
//! The engine is a pure function of `(stored, request, clock)`. It reads the
//! clock once per invocation and walks maps in insertion order, so the same
//! inputs with a fixed clock always produce the same output. Hosts can retry
//! an invocation after a commit race without special handling.

pub mod auxiliary;
pub mod classify;
pub mod create;
pub mod finalize;
pub mod integrity;
pub mod merge;
pub mod publish;
pub mod tags;
pub mod unpublish;

use tracing::instrument;

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::UpdateError;
use crate::model::{PackageDocument, UpdateRequest};
use crate::version::{NpmSemver, VersionScheme};

use classify::{Operation, Route, RouteKind};

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// A successful update: the document to persist and the acknowledgement.
#[derive(Clone, Debug, PartialEq)]
pub struct Update {
    /// Document state to commit.
    pub document: PackageDocument,
    /// Human-readable acknowledgement (`"added version"`, ...).
    pub message: &'static str,
    /// Which handler produced the update.
    pub route: RouteKind,
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// Everything a handler needs besides the document itself.
pub struct Invocation<'a> {
    /// Engine configuration.
    pub config: &'a EngineConfig,
    /// Version validation and canonicalisation.
    pub scheme: &'a dyn VersionScheme,
    /// The request being applied.
    pub request: &'a UpdateRequest,
    /// Timestamp for every time entry this invocation writes.
    pub now: String,
}

impl Invocation<'_> {
    /// Verified identity of the requester.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.request.user
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The reconciliation engine.
///
/// Cheap to construct and stateless between calls; one engine can serve any
/// number of documents.
#[derive(Clone, Debug, Default)]
pub struct Engine<C = SystemClock, S = NpmSemver> {
    config: EngineConfig,
    clock: C,
    scheme: S,
}

impl Engine {
    /// An engine with the system clock and npm-compatible versions.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self {
            config,
            clock: SystemClock,
            scheme: NpmSemver,
        }
    }
}

impl<C: Clock, S: VersionScheme> Engine<C, S> {
    /// An engine with an explicit clock and version scheme.
    pub const fn with_parts(config: EngineConfig, clock: C, scheme: S) -> Self {
        Self {
            config,
            clock,
            scheme,
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn invocation<'a>(&'a self, request: &'a UpdateRequest) -> Invocation<'a> {
        Invocation {
            config: &self.config,
            scheme: &self.scheme,
            request,
            now: self.clock.now(),
        }
    }

    /// Apply a write request to the stored document (or create one).
    ///
    /// # Errors
    /// Returns an [`UpdateError`] if the request is invalid, would modify a
    /// published version, or leaves the document without maintainers. The
    /// stored document is never partially updated.
    #[instrument(skip_all, fields(
        package = stored.as_ref().and_then(|d| d.id.as_deref()),
        user = %request.user,
        target = request.query.target(),
        route = tracing::field::Empty,
    ))]
    pub fn update(
        &self,
        stored: Option<PackageDocument>,
        request: &UpdateRequest,
    ) -> Result<Update, UpdateError> {
        let inv = self.invocation(request);
        let result = apply(&inv, stored);
        match &result {
            Ok(update) => tracing::debug!(
                package = update.document.id.as_deref(),
                message = update.message,
                "update accepted"
            ),
            Err(e) => tracing::warn!(kind = %e.kind(), reason = %e, "update rejected"),
        }
        result
    }

    /// Soft-delete the stored document.
    ///
    /// # Errors
    /// Returns [`UpdateError::MethodNotAllowed`] unless the request uses
    /// `DELETE`, and a validation error if there is no stored document.
    #[instrument(skip_all, fields(
        package = stored.as_ref().and_then(|d| d.id.as_deref()),
        user = %request.user,
        method = %request.method,
    ))]
    pub fn unpublish(
        &self,
        stored: Option<PackageDocument>,
        request: &UpdateRequest,
    ) -> Result<Update, UpdateError> {
        let inv = self.invocation(request);
        let result = unpublish::unpublish(&inv, stored).map(|document| Update {
            document,
            message: unpublish::MESSAGE,
            route: RouteKind::Unpublish,
        });
        if let Err(e) = &result {
            tracing::warn!(kind = %e.kind(), reason = %e, "unpublish rejected");
        }
        result
    }
}

fn apply(inv: &Invocation<'_>, stored: Option<PackageDocument>) -> Result<Update, UpdateError> {
    let body = classify::parse_body(&inv.request.body)?;
    let route = classify::classify(stored, &inv.request.query, body);
    let kind = route.kind();
    tracing::Span::current().record("route", tracing::field::display(kind));

    let (document, message) = match route {
        Route::Create { body } => (create::create(inv, body)?, "created new entry"),
        Route::Existing { doc, op } => {
            let mut doc = *doc;
            let message = match op {
                Operation::AssignTag { tag, version } => {
                    tags::assign(inv, &mut doc, &tag, &version)?;
                    "updated tag"
                }
                Operation::AddVersion { version, body } => {
                    publish::publish(inv, &mut doc, &version, body)?;
                    "added version"
                }
                Operation::MergeDocument { body } => {
                    merge::merge_document(inv, &mut doc, body)?;
                    "updated package"
                }
            };
            (doc, message)
        }
    };

    let document = finalize::finalize(inv, document)?;
    Ok(Update {
        document,
        message,
        route: kind,
    })
}
