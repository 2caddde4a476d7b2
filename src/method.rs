//! The closed set of HTTP methods a dispatcher accepts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// One of the five methods handlers can be registered under.
///
/// Tokens are matched exactly (`"GET"`, not `"get"`), the same way the
/// method arrives on the request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// All supported methods in declaration order.
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Parse a method token, failing with `UnsupportedMethod`.
    pub fn parse(token: &str) -> Result<Self, DispatchError> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == token)
            .ok_or_else(|| DispatchError::UnsupportedMethod {
                method: token.to_string(),
            })
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::parse(s)
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = DispatchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HttpMethod::parse(&value)
    }
}

impl From<HttpMethod> for String {
    fn from(m: HttpMethod) -> Self {
        m.as_str().to_string()
    }
}

impl TryFrom<&http::Method> for HttpMethod {
    type Error = DispatchError;

    fn try_from(value: &http::Method) -> Result<Self, Self::Error> {
        HttpMethod::parse(value.as_str())
    }
}

impl From<HttpMethod> for http::Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Patch => http::Method::PATCH,
        }
    }
}
