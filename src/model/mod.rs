//! Package document data model: the stored document, version records, the
//! incoming request, and package-name rules.

pub mod document;
pub mod name;
pub mod record;
pub mod request;

pub use document::{Attachment, DistTags, PackageDocument, Person, TimeMap, Unpublished, Versions};
pub use record::VersionRecord;
pub use request::{Method, Query, UpdateRequest};
