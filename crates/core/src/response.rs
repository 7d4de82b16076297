//! Captured responses, as returned by the network and stored in a namespace.

use std::str::FromStr;

use bytes::Bytes;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;

/// Response type as a browser would report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin response.
    Basic,
    /// Readable cross-origin response.
    Cors,
    /// Cross-origin `no-cors` response; status and body are hidden.
    Opaque,
    Error,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Basic => "basic",
            ResponseKind::Cors => "cors",
            ResponseKind::Opaque => "opaque",
            ResponseKind::Error => "error",
        }
    }
}

impl FromStr for ResponseKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(ResponseKind::Basic),
            "cors" => Ok(ResponseKind::Cors),
            "opaque" => Ok(ResponseKind::Opaque),
            "error" => Ok(ResponseKind::Error),
            other => Err(Error::CorruptEntry(format!("unknown response kind: {other}"))),
        }
    }
}

/// A complete response snapshot.
///
/// The body is reference counted, so clones handed to storage and to the
/// caller share one buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Final URL after redirects.
    pub url: Url,
    /// Status code; `0` for opaque responses.
    pub status: u16,
    pub kind: ResponseKind,
    pub redirected: bool,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    /// Same-origin response without redirects.
    pub fn basic(url: Url, status: u16, body: impl Into<Bytes>) -> Self {
        Self { url, status, kind: ResponseKind::Basic, redirected: false, headers: HeaderMap::new(), body: body.into() }
    }

    /// Opaque response: no status, no headers, no body.
    pub fn opaque(url: Url) -> Self {
        Self { url, status: 0, kind: ResponseKind::Opaque, redirected: false, headers: HeaderMap::new(), body: Bytes::new() }
    }

    /// Status in the 200-299 range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether stale-while-revalidate may persist this response.
    ///
    /// Only a readable, unredirected, plain 200 qualifies; partial content,
    /// redirects and opaque responses would pollute the namespace.
    pub fn is_revalidation_eligible(&self) -> bool {
        self.status == 200 && matches!(self.kind, ResponseKind::Basic | ResponseKind::Cors) && !self.redirected
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(http::header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}
