//! Store client - the protocol client every flow goes through.
//!
//! Owns the transport, the configuration and the credential slot. Every
//! outbound request gets the configurator User-Agent and, once a credential
//! is attached, the identity headers and the session cookies.

use std::sync::Arc;

use tracing::warn;

use crate::config::ClientConfig;
use crate::credential::SessionCredential;
use crate::error::StoreError;
use crate::events::{StoreEvent, StoreObserver, TracingObserver};
use crate::protocol::constants::{HEADER_DSID, HEADER_ICLOUD_DSID};
use crate::state::{AuthPhase, SessionState};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

/// Client for the configurator purchase API.
///
/// One credential negotiation per client: callers wanting several sessions
/// use several clients.
pub struct StoreClient<T: HttpTransport, O: StoreObserver> {
    transport: T,
    observer: Arc<O>,
    config: ClientConfig,
    pub(crate) state: SessionState,
}

impl StoreClient<ReqwestTransport, TracingObserver> {
    /// Create a client over reqwest with the default tracing observer.
    pub fn new(config: ClientConfig) -> Result<Self, StoreError> {
        let transport = ReqwestTransport::with_timeout(config.timeout())?;
        Ok(Self::with_transport(
            transport,
            config,
            Arc::new(TracingObserver),
        ))
    }
}

impl<T: HttpTransport, O: StoreObserver> StoreClient<T, O> {
    /// Create a client with a custom transport and observer.
    pub fn with_transport(transport: T, config: ClientConfig, observer: Arc<O>) -> Self {
        Self {
            transport,
            observer,
            config,
            state: SessionState::Unauthenticated,
        }
    }

    /// Attach a credential restored from storage.
    pub fn with_credential(mut self, credential: SessionCredential) -> Self {
        self.state.discard();
        self.state.attach(credential);
        self
    }

    pub fn credential(&self) -> Option<&SessionCredential> {
        self.state.credential()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn phase(&self) -> AuthPhase {
        self.state.phase()
    }

    /// Drop the attached credential. There is no server-side logout.
    pub fn discard_credential(&mut self) -> Option<SessionCredential> {
        let discarded = self.state.discard();
        if discarded.is_some() {
            self.emit(StoreEvent::PhaseChanged {
                from: AuthPhase::Authenticated,
                to: AuthPhase::Unauthenticated,
            });
        }
        discarded
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn emit(&self, event: StoreEvent) {
        self.observer.on_event(&event);
    }

    /// Report a failed flow to the observer and hand the error back.
    pub(crate) fn fail(&self, error: StoreError) -> StoreError {
        self.emit(StoreEvent::Error {
            kind: error.kind(),
            message: error.to_string(),
        });
        error
    }

    /// Send a request and classify the outcome.
    ///
    /// Error statuses become [`StoreError::Upstream`] without looking at the
    /// body, which is not guaranteed to be a plist.
    pub fn send(&self, request: HttpRequest) -> Result<HttpResponse, StoreError> {
        let request = self.prepare(request);

        self.emit(StoreEvent::RequestSent {
            method: request.method,
            url: request.url.clone(),
        });

        let response = self.transport.send(&request)?;

        self.emit(StoreEvent::ResponseReceived {
            status: response.status,
            length: response.body.len(),
        });

        if response.is_error() {
            warn!(status = %response.status_text, url = %request.url, "Upstream error");
            return Err(StoreError::Upstream {
                status: response.status_text,
            });
        }

        Ok(response)
    }

    fn prepare(&self, mut request: HttpRequest) -> HttpRequest {
        request.set_header("User-Agent", self.config.user_agent.as_str());
        if let Some(credential) = self.state.credential() {
            request.set_header(HEADER_DSID, credential.account_numeric_id());
            request.set_header(HEADER_ICLOUD_DSID, credential.account_numeric_id());
            if let Some(cookies) = credential.cookie_header() {
                request.set_header("Cookie", cookies);
            }
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::tests::sample_credential;
    use crate::events::NullObserver;
    use crate::protocol::constants::USER_AGENT;
    use crate::transport::{MockTransport, TransportError};

    fn client(mock: &MockTransport) -> StoreClient<MockTransport, NullObserver> {
        StoreClient::with_transport(mock.clone(), ClientConfig::default(), Arc::new(NullObserver))
    }

    #[test]
    fn test_unauthenticated_request_has_only_user_agent() {
        let mock = MockTransport::new();
        mock.queue_response(HttpResponse::new(200, vec![]));

        client(&mock)
            .send(HttpRequest::get("https://example.com"))
            .unwrap();

        let sent = &mock.get_requests()[0];
        assert_eq!(sent.header_value("User-Agent"), Some(USER_AGENT));
        assert!(sent.header_value(HEADER_DSID).is_none());
        assert!(sent.header_value("Cookie").is_none());
    }

    #[test]
    fn test_authenticated_request_carries_identity() {
        let mock = MockTransport::new();
        mock.queue_response(HttpResponse::new(200, vec![]));

        client(&mock)
            .with_credential(sample_credential())
            .send(HttpRequest::get("https://example.com"))
            .unwrap();

        let sent = &mock.get_requests()[0];
        assert_eq!(sent.header_value("X-Dsid"), Some("12345"));
        assert_eq!(sent.header_value("iCloud-DSID"), Some("12345"));
        assert_eq!(sent.header_value("Cookie"), Some("session=abc; mz_at0=xyz"));
    }

    #[test]
    fn test_error_status_is_upstream_error() {
        let mock = MockTransport::new();
        mock.queue_response(HttpResponse::new(503, b"<html>busy</html>".to_vec()));

        let err = client(&mock)
            .send(HttpRequest::get("https://example.com"))
            .unwrap_err();
        match err {
            StoreError::Upstream { status } => assert_eq!(status, "503 Service Unavailable"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_transport_failure_is_transport_error() {
        let mock = MockTransport::new();
        mock.queue_error(TransportError::Connect("dns failure".into()));

        let err = client(&mock)
            .send(HttpRequest::get("https://example.com"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Transport(TransportError::Connect(_))));
    }

    #[test]
    fn test_discard_credential() {
        let mock = MockTransport::new();
        let mut client = client(&mock).with_credential(sample_credential());
        assert!(client.is_authenticated());

        let cred = client.discard_credential().unwrap();
        assert_eq!(cred.account_id(), "user@example.com");
        assert_eq!(client.phase(), AuthPhase::Unauthenticated);
        assert!(client.discard_credential().is_none());
    }
}
