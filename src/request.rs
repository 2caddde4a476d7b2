//! # Inbound Request Interface
//!
//! The dispatcher never reads ambient request state. The host hands it an
//! [`InboundRequest`], which exposes exactly what a dispatch consumes: the
//! method token, the header set, the query parameters, and a one-shot body
//! read.
//!
//! [`HttpRequest`] is an owned implementation for hosts that already have
//! the request parsed, and for tests.

use std::io;

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use tracing::debug;

use crate::error::DispatchError;

/// Header that marks a request as coming from an XMLHttpRequest client.
pub const XHR_HEADER: &str = "x-requested-with";

/// Value [`XHR_HEADER`] must carry.
pub const XHR_VALUE: &str = "XMLHttpRequest";

/// Why the header set of a request could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderAccessError {
    /// The host has no way to expose request headers.
    Unsupported,
    /// The host tried and failed.
    Failed(String),
}

/// The current request, as supplied by the hosting environment.
pub trait InboundRequest {
    /// Method token exactly as received.
    fn method(&self) -> &str;

    /// Header set of the request. A missing header is an absent key, not an error.
    fn headers(&self) -> Result<&HeaderMap, HeaderAccessError>;

    /// Query string parameters, in the order they appeared.
    fn query_pairs(&self) -> Vec<(String, String)>;

    /// Read the raw request body. Called at most once per dispatch.
    fn read_body(&mut self) -> io::Result<Vec<u8>>;
}

/// Reject anything that is not an XMLHttpRequest.
pub(crate) fn verify_xhr<R: InboundRequest + ?Sized>(request: &R) -> Result<(), DispatchError> {
    let headers = match request.headers() {
        Ok(h) => h,
        Err(HeaderAccessError::Unsupported) => {
            return Err(DispatchError::transport(
                "request headers are not available in this environment",
            ))
        }
        Err(HeaderAccessError::Failed(reason)) => {
            return Err(DispatchError::transport(format!(
                "failed to retrieve request headers: {reason}"
            )))
        }
    };

    match headers.get(XHR_HEADER) {
        Some(v) if v.as_bytes() == XHR_VALUE.as_bytes() => Ok(()),
        Some(v) => {
            debug!(value = ?v, "X-Requested-With mismatch");
            Err(DispatchError::transport(
                "X-Requested-With header is not XMLHttpRequest",
            ))
        }
        None => Err(DispatchError::transport(
            "missing X-Requested-With header; not an XMLHttpRequest",
        )),
    }
}

/// Parse query string parameters from a URL path or bare query string.
///
/// Everything after the first `?` is decoded; a string without `?` is
/// treated as the query itself unless it starts with `/`.
#[must_use]
pub fn parse_query_pairs(target: &str) -> Vec<(String, String)> {
    let query = match target.find('?') {
        Some(pos) => &target[pos + 1..],
        None if target.starts_with('/') => "",
        None => target,
    };
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Owned, already-parsed request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: String,
    headers: Option<HeaderMap>,
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// A request with the given method and target (`/path?query`).
    pub fn new(method: impl Into<String>, target: &str) -> Self {
        Self {
            method: method.into(),
            headers: Some(HeaderMap::new()),
            query: parse_query_pairs(target),
            body: None,
        }
    }

    pub fn get(target: &str) -> Self {
        Self::new("GET", target)
    }

    pub fn post(target: &str) -> Self {
        Self::new("POST", target)
    }

    pub fn put(target: &str) -> Self {
        Self::new("PUT", target)
    }

    pub fn delete(target: &str) -> Self {
        Self::new("DELETE", target)
    }

    pub fn patch(target: &str) -> Self {
        Self::new("PATCH", target)
    }

    /// Add a header. Invalid names or values are skipped with a debug log.
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(n), Ok(v)) => {
                self.headers.get_or_insert_with(HeaderMap::new).append(n, v);
            }
            _ => debug!(header = %name, "Skipping invalid header"),
        }
        self
    }

    /// Mark the request as an XMLHttpRequest.
    #[must_use]
    pub fn xhr(self) -> Self {
        self.header(XHR_HEADER, XHR_VALUE)
    }

    /// Simulate a host that cannot expose headers at all.
    #[must_use]
    pub fn without_headers(mut self) -> Self {
        self.headers = None;
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Body from `(name, value)` pairs, url-encoded.
    #[must_use]
    pub fn form<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        self.body(encoded)
    }
}

impl InboundRequest for HttpRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn headers(&self) -> Result<&HeaderMap, HeaderAccessError> {
        self.headers.as_ref().ok_or(HeaderAccessError::Unsupported)
    }

    fn query_pairs(&self) -> Vec<(String, String)> {
        self.query.clone()
    }

    fn read_body(&mut self) -> io::Result<Vec<u8>> {
        Ok(self.body.take().unwrap_or_default())
    }
}
