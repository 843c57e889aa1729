//! Wire types shared between the dispatch shell and the forwarder
//!
//! The `{status, data}` envelope is the load-bearing contract of the whole
//! gateway: every remote HTTP outcome, success or failure, is reduced to it.
//! Callers inspect `status`; nothing at this layer throws on 4xx/5xx.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// HTTP methods accepted across the boundary
///
/// Deserialized case-insensitively; an absent method means GET.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET (default)
    #[default]
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Canonical upper-case name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Parse a method name, ignoring case. Empty input means GET.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Delete => Self::DELETE,
        }
    }
}

impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| {
            serde::de::Error::custom(format!("unsupported HTTP method: {s:?}"))
        })
    }
}

/// A request descriptor forwarded to the remote API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRequest {
    /// HTTP method (defaults to GET when absent)
    #[serde(default)]
    pub method: HttpMethod,
    /// Path relative to the current base URL, e.g. `/vagas/1`
    pub path: String,
    /// Extra headers; caller entries win over gateway defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    /// Optional body. A JSON string is sent raw; any other value is
    /// serialized to JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Build a request with the given method and path
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: None,
            body: None,
        }
    }

    /// Build a GET request
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Build a POST request with a JSON body
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        let mut req = Self::new(HttpMethod::Post, path);
        req.body = Some(body);
        req
    }

    /// Attach a header, replacing any previous value for the same name
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Attach a body
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// The `{status, data}` envelope returned for every forwarded call
///
/// `data` is never absent: a response body that fails to parse as JSON
/// degrades to its raw text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code of the remote response
    pub status: u16,
    /// Parsed JSON body, or the raw text when parsing fails
    pub data: Value,
}

impl ApiResponse {
    /// Build an envelope
    #[must_use]
    pub fn new(status: u16, data: Value) -> Self {
        Self { status, data }
    }

    /// Whether the remote answered with a 2xx status
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse a raw response body: JSON when possible, raw text otherwise
    #[must_use]
    pub fn from_text(status: u16, text: String) -> Self {
        let data = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Self { status, data }
    }
}

/// Normalize a request path to exactly one leading slash
#[must_use]
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

/// Normalize a base URL: trim whitespace, strip trailing slashes.
/// Returns `None` for empty or whitespace-only input.
#[must_use]
pub fn normalize_base_url(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
