//! HTTP round-trips described as plain data.
//!
//! The client never touches the network itself: it hands the host an
//! [`HttpRequest`] to execute and consumes the [`HttpResponse`] the host
//! got back. This keeps every contract detail unit-testable without a
//! server.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// A request the host should execute.
///
/// `url` is already absolute when a base URL is configured, or
/// origin-relative (e.g. `/api/children`) when it is not.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    /// JSON body, when the endpoint takes one. Requests carrying a body
    /// should be sent with a `Content-Type: application/json` header.
    pub body: Option<String>,
}

impl HttpRequest {
    pub(crate) fn bare(method: HttpMethod, url: String) -> Self {
        Self {
            method,
            url,
            body: None,
        }
    }

    pub(crate) fn json(method: HttpMethod, url: String, body: String) -> Self {
        Self {
            method,
            url,
            body: Some(body),
        }
    }
}

/// What the host got back from executing an [`HttpRequest`].
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}
