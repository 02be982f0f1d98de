//! regdoc library crate.
//!
//! A reconciliation engine for package-registry metadata documents. The
//! host document store hands over the stored document (if any) and one
//! write request; the engine answers with the next document state and a
//! client message, or with an error marker the store must refuse to save.
//!
//! ```no_run
//! use regdoc::{Engine, EngineConfig, Response, UpdateRequest};
//!
//! let engine = Engine::new(EngineConfig::default());
//! let request = UpdateRequest::put("alice", r#"{"name":"pkg","maintainers":[{"name":"alice"}]}"#);
//! let response = Response::from_result(engine.update(None, &request));
//! assert!(!response.is_error());
//! ```
//!
//! The `regdoc` binary drives the same engine from JSON files.

pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod response;
pub mod update;
pub mod version;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, EngineConfig, LatestSelection};
pub use error::{ErrorKind, UpdateError, ValidationError};
pub use model::{Method, PackageDocument, Query, UpdateRequest, VersionRecord};
pub use response::{Persist, Response};
pub use update::classify::RouteKind;
pub use update::{Engine, Update};
pub use version::{NpmSemver, Strictness, VersionScheme};
