//! Mock HTTP transport for testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::traits::{HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Mock transport for unit testing client flows.
///
/// Clones share the same queue and log, so a test can keep one handle
/// and give the other to the client.
#[derive(Clone, Default)]
pub struct MockTransport {
    /// Queued responses to return, in order.
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    /// Captured requests.
    request_log: Arc<Mutex<Vec<HttpRequest>>>,
    /// Answer every request with its own body instead of the queue.
    echo: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that answers 200 with the request body echoed back.
    pub fn echo() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Queue a response to be returned on the next send.
    pub fn queue_response(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a transport failure.
    pub fn queue_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get all captured requests.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        self.request_log.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.request_log.lock().unwrap().len()
    }

    /// Clear captured requests.
    pub fn clear_requests(&self) {
        self.request_log.lock().unwrap().clear();
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.request_log.lock().unwrap().push(request.clone());

        if self.echo {
            return Ok(HttpResponse::new(200, request.body.clone().unwrap_or_default()));
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no queued response".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_response_queue() {
        let mock = MockTransport::new();
        mock.queue_response(HttpResponse::new(200, b"first".to_vec()));
        mock.queue_error(TransportError::Connect("refused".into()));

        let first = mock.send(&HttpRequest::get("https://a")).unwrap();
        assert_eq!(first.body, b"first");

        assert!(matches!(
            mock.send(&HttpRequest::get("https://b")),
            Err(TransportError::Connect(_))
        ));

        // Queue is empty now
        assert!(mock.send(&HttpRequest::get("https://c")).is_err());
        assert_eq!(mock.request_count(), 3);
    }

    #[test]
    fn test_mock_echo() {
        let mock = MockTransport::echo();
        let resp = mock
            .send(&HttpRequest::post("https://a").body(b"ping".to_vec(), "text/plain"))
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, b"ping");
    }

    #[test]
    fn test_mock_request_capture_shared_between_clones() {
        let mock = MockTransport::echo();
        let handle = mock.clone();
        mock.send(&HttpRequest::get("https://a").query("guid", "abc"))
            .unwrap();

        let requests = handle.get_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query_value("guid"), Some("abc"));

        handle.clear_requests();
        assert_eq!(mock.request_count(), 0);
    }
}
