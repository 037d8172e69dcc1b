//! reqwest-based HTTP transport implementation.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, instrument};

use super::traits::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError, status_line};
use crate::credential::SessionCookie;

/// Blocking reqwest transport with a bounded request timeout.
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    fn classify(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, &request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().map_err(|e| self.classify(e))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let cookies = response
            .cookies()
            .map(|c| SessionCookie::from_reqwest(&c))
            .collect();
        let body = response
            .bytes()
            .map_err(|e| TransportError::Body(e.to_string()))?
            .to_vec();

        debug!(status = status.as_u16(), bytes_read = body.len(), "Response received");

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status_line(status.as_u16()),
            headers,
            cookies,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_failure_is_transport_error() {
        let transport = ReqwestTransport::with_timeout(Duration::from_secs(2)).unwrap();
        // Port 1 on loopback is never listening in test environments.
        let err = transport
            .send(&HttpRequest::get("http://127.0.0.1:1/"))
            .unwrap_err();
        assert!(matches!(
            err,
            TransportError::Connect(_) | TransportError::Request(_)
        ));
    }
}
