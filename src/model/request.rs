//! The update request as the host store hands it over.
//!
//! HTTP parsing and authentication happen upstream. By the time a request
//! reaches the engine it is a verb, the query parameters the update handler
//! understands, the raw body text, and a verified identity.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// HTTP verb of the incoming request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
    /// Any other verb, upper-cased.
    Other(String),
}

impl FromStr for Method {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Ok(match upper.as_str() {
            "GET" => Self::Get,
            "PUT" => Self::Put,
            "POST" => Self::Post,
            "DELETE" => Self::Delete,
            _ => Self::Other(upper),
        })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Put => write!(f, "PUT"),
            Self::Post => write!(f, "POST"),
            Self::Delete => write!(f, "DELETE"),
            Self::Other(verb) => f.write_str(verb),
        }
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Query parameters recognised by the update handler.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    /// Addressed version or tag (`/:pkg/:version`).
    pub version: Option<String>,
    /// Explicit dist-tag to apply when publishing.
    pub tag: Option<String>,
    /// Publish without moving any dist-tag.
    pub pre: bool,
}

impl Query {
    /// The addressed version, treating an empty value as absent.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.is_empty())
    }

    /// The explicit tag, treating an empty value as absent.
    #[must_use]
    pub fn explicit_tag(&self) -> Option<&str> {
        self.tag.as_deref().filter(|t| !t.is_empty())
    }
}

// ---------------------------------------------------------------------------
// UpdateRequest
// ---------------------------------------------------------------------------

/// One write against one package document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateRequest {
    /// HTTP verb.
    pub method: Method,
    /// Recognised query parameters.
    pub query: Query,
    /// Raw body text (JSON).
    pub body: String,
    /// Verified identity of the requester.
    pub user: String,
}

impl UpdateRequest {
    /// A `PUT` with the given identity and body and no query parameters.
    pub fn put(user: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Put,
            query: Query::default(),
            body: body.into(),
            user: user.into(),
        }
    }

    /// A `DELETE` with the given identity and an empty body.
    pub fn delete(user: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            query: Query::default(),
            body: String::new(),
            user: user.into(),
        }
    }

    /// Address a specific version (or tag name, for tag assignment).
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.query.version = Some(version.into());
        self
    }

    /// Publish under an explicit dist-tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.query.tag = Some(tag.into());
        self
    }

    /// Publish without moving dist-tags.
    #[must_use]
    pub const fn pre_release(mut self) -> Self {
        self.query.pre = true;
        self
    }

    /// Override the HTTP verb.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }
}
