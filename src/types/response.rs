//! Network responses and the immutable snapshots stored in a cache.

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

/// Classification of a response relative to the requesting page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Same-origin response with readable status, headers and body.
    #[default]
    Basic,
    /// Cross-origin response permitted by CORS.
    Cors,
    /// Cross-origin response whose contents are hidden from the page.
    Opaque,
    /// Redirect captured with `redirect: manual`.
    OpaqueRedirect,
    /// Network-level error surfaced as a response.
    Error,
}

/// A live network response.
///
/// Not `Clone`: like a streamed body, a response is consumed once. Call
/// [`duplicate()`](Self::duplicate) before handing one copy to the page and
/// another to the cache.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    response_type: ResponseType,
    url: Option<Url>,
    redirected: bool,
    body: Bytes,
}

impl Response {
    /// Create a basic, non-redirected response.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            response_type: ResponseType::Basic,
            url: None,
            redirected: false,
            body: body.into(),
        }
    }

    /// Shorthand for a `200 OK` basic response.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn with_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Record the final URL after redirects.
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    pub fn with_redirected(mut self, redirected: bool) -> Self {
        self.redirected = redirected;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn response_type(&self) -> ResponseType {
        self.response_type
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn redirected(&self) -> bool {
        self.redirected
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response and take its body.
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Status in the 200–299 range.
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    /// Whether a freshly fetched response may be written back into the
    /// pre-cache store: exactly `200`, basic type, not redirected.
    pub fn is_write_back_eligible(&self) -> bool {
        self.status == StatusCode::OK
            && self.response_type == ResponseType::Basic
            && !self.redirected
    }

    /// Produce an independent copy of this response.
    pub fn duplicate(&self) -> Response {
        Response {
            status: self.status,
            headers: self.headers.clone(),
            response_type: self.response_type,
            url: self.url.clone(),
            redirected: self.redirected,
            body: self.body.clone(),
        }
    }
}

/// Immutable capture of a response as stored in a cache.
#[derive(Debug, Clone)]
pub struct ResponseSnapshot {
    status: StatusCode,
    headers: HeaderMap,
    response_type: ResponseType,
    url: Option<Url>,
    redirected: bool,
    body: Bytes,
}

impl ResponseSnapshot {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn response_type(&self) -> ResponseType {
        self.response_type
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Materialise a fresh response for delivery to a page.
    pub fn to_response(&self) -> Response {
        Response {
            status: self.status,
            headers: self.headers.clone(),
            response_type: self.response_type,
            url: self.url.clone(),
            redirected: self.redirected,
            body: self.body.clone(),
        }
    }
}

impl From<Response> for ResponseSnapshot {
    fn from(response: Response) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            response_type: response.response_type,
            url: response.url,
            redirected: response.redirected,
            body: response.body,
        }
    }
}
