//! HTTP transport layer abstraction.
//!
//! Defines the `HttpTransport` trait for issuing requests,
//! allowing different implementations (reqwest, mock, etc.).

use std::fmt;

use thiserror::Error;

use crate::credential::SessionCookie;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// Outbound request, fully described before it reaches a transport.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Set a header, replacing any existing header of the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    pub fn body(mut self, body: Vec<u8>, content_type: &str) -> Self {
        self.body = Some(body);
        self.header("Content-Type", content_type)
    }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Response as seen by the protocol client.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// Status line text, e.g. "500 Internal Server Error".
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    /// Cookies set by the server on this response.
    pub cookies: Vec<SessionCookie>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            status_text: status_line(status),
            body,
            ..Default::default()
        }
    }

    pub fn with_cookie(mut self, cookie: SessionCookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 4xx and 5xx are failures.
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Status line as reqwest renders it, e.g. "418 I'm a teapot".
pub(crate) fn status_line(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .map(|s| s.to_string())
        .unwrap_or_else(|_| status.to_string())
}

/// Abstract HTTP transport interface.
///
/// This trait enables:
/// - Production implementation using reqwest
/// - Mock implementation for unit testing
pub trait HttpTransport: Send + Sync {
    /// Send a request and return the raw response, whatever its status.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let req = HttpRequest::post("https://example.com")
            .header("X-Dsid", "1")
            .header("x-dsid", "2");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header_value("X-DSID"), Some("2"));
    }

    #[test]
    fn test_body_sets_content_type() {
        let req = HttpRequest::post("https://example.com").body(vec![1, 2], "application/x-apple-plist");
        assert_eq!(req.body.as_deref(), Some(&[1u8, 2][..]));
        assert_eq!(
            req.header_value("content-type"),
            Some("application/x-apple-plist")
        );
    }

    #[test]
    fn test_response_status_classification() {
        assert!(!HttpResponse::new(200, vec![]).is_error());
        assert!(!HttpResponse::new(302, vec![]).is_error());
        assert!(HttpResponse::new(404, vec![]).is_error());

        let resp = HttpResponse::new(500, vec![]);
        assert!(resp.is_error());
        assert_eq!(resp.status_text, "500 Internal Server Error");
    }

    #[test]
    fn test_status_line_matches_reqwest() {
        assert_eq!(HttpResponse::new(418, vec![]).status_text, "418 I'm a teapot");
        assert_eq!(HttpResponse::new(429, vec![]).status_text, "429 Too Many Requests");
        assert_eq!(status_line(1000), "1000");
    }
}
