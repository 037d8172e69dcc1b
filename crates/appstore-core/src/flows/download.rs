//! Download negotiation flow.
//!
//! Asks the purchase API for a signed package URL. The shape of the answer
//! belongs to the vendor, so it is returned as an opaque nested mapping.

use tracing::{info, instrument};

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::events::StoreObserver;
use crate::protocol::constants::*;
use crate::protocol::{PlistValue, RequestPayload, ResponseMapping, decode, encode};
use crate::transport::{HttpRequest, HttpTransport};

/// Decoded answer of the download negotiation endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiationResult {
    mapping: ResponseMapping,
}

impl NegotiationResult {
    pub fn mapping(&self) -> &ResponseMapping {
        &self.mapping
    }

    pub fn get(&self, key: &str) -> Option<&PlistValue> {
        self.mapping.get(key)
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.mapping.to_json()
    }
}

pub(crate) fn download_payload(device_id: &str, track_id: &str) -> RequestPayload {
    RequestPayload::new()
        .with(FIELD_CREDIT_DISPLAY, "")
        .with(FIELD_GUID, device_id)
        .with(FIELD_SALABLE_ADAM_ID, track_id)
}

impl<T: HttpTransport, O: StoreObserver> StoreClient<T, O> {
    /// Negotiate a download of catalog item `track_id`.
    ///
    /// Fails with [`StoreError::NotAuthenticated`] before touching the
    /// network if no credential is attached. Nothing is written to disk.
    #[instrument(skip(self))]
    pub fn negotiate_download(&self, track_id: &str) -> Result<NegotiationResult, StoreError> {
        let credential = self
            .credential()
            .ok_or_else(|| self.fail(StoreError::NotAuthenticated))?;

        let payload = download_payload(credential.device_id(), track_id);
        let body = encode(&payload).map_err(|e| self.fail(e))?;
        let request = HttpRequest::post(self.config().endpoints.download.as_str())
            .query(QUERY_GUID, credential.device_id())
            .header(HEADER_DSID, credential.account_numeric_id())
            .header(HEADER_ICLOUD_DSID, credential.account_numeric_id())
            .body(body, PLIST_CONTENT_TYPE);

        let mapping = self
            .send(request)
            .and_then(|response| decode(&response.body))
            .map_err(|e| self.fail(e))?;

        info!(fields = mapping.len(), "Download negotiated");
        Ok(NegotiationResult { mapping })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ClientConfig;
    use crate::credential::tests::sample_credential;
    use crate::events::NullObserver;
    use crate::transport::{HttpResponse, MockTransport};

    fn client(mock: &MockTransport) -> StoreClient<MockTransport, NullObserver> {
        StoreClient::with_transport(mock.clone(), ClientConfig::default(), Arc::new(NullObserver))
    }

    #[test]
    fn test_requires_credential_before_network() {
        let mock = MockTransport::echo();
        let err = client(&mock).negotiate_download("284882215").unwrap_err();
        assert!(matches!(err, StoreError::NotAuthenticated));
        assert_eq!(mock.request_count(), 0);
    }

    #[test]
    fn test_echoed_fields_come_back_unmodified() {
        let mock = MockTransport::echo();
        let client = client(&mock).with_credential(sample_credential());

        let result = client.negotiate_download("284882215").unwrap();

        let field = |k: &str| result.get(k).and_then(PlistValue::as_str);
        assert_eq!(field("creditDisplay"), Some(""));
        assert_eq!(field("guid"), Some("aabbccddeeff"));
        assert_eq!(field("salableAdamId"), Some("284882215"));
        assert_eq!(result.mapping().len(), 3);
    }

    #[test]
    fn test_request_wiring() {
        let mock = MockTransport::echo();
        client(&mock)
            .with_credential(sample_credential())
            .negotiate_download("1")
            .unwrap();

        let sent = &mock.get_requests()[0];
        assert_eq!(sent.url, DOWNLOAD_URL);
        assert_eq!(sent.query_value("guid"), Some("aabbccddeeff"));
        assert_eq!(sent.header_value("X-Dsid"), Some("12345"));
        assert_eq!(sent.header_value("iCloud-DSID"), Some("12345"));
        assert_eq!(sent.header_value("Content-Type"), Some(PLIST_CONTENT_TYPE));
        assert_eq!(sent.header_value("Cookie"), Some("session=abc; mz_at0=xyz"));
    }

    #[test]
    fn test_nested_result_is_preserved() {
        let mut song = plist::Dictionary::new();
        song.insert(
            "URL".into(),
            plist::Value::String("https://cdn.example.com/app.ipa".into()),
        );
        let mut root = plist::Dictionary::new();
        root.insert(
            "songList".into(),
            plist::Value::Array(vec![plist::Value::Dictionary(song)]),
        );
        let mut body = Vec::new();
        plist::Value::Dictionary(root)
            .to_writer_binary(&mut body)
            .unwrap();

        let mock = MockTransport::new();
        mock.queue_response(HttpResponse::new(200, body));

        let result = client(&mock)
            .with_credential(sample_credential())
            .negotiate_download("1")
            .unwrap();

        assert_eq!(
            result.to_json(),
            serde_json::json!({ "songList": [{ "URL": "https://cdn.example.com/app.ipa" }] })
        );
    }

    #[test]
    fn test_undecodable_body_is_malformed() {
        let mock = MockTransport::new();
        mock.queue_response(HttpResponse::new(200, b"bplist00\x01\x02".to_vec()));

        let err = client(&mock)
            .with_credential(sample_credential())
            .negotiate_download("1")
            .unwrap_err();
        assert!(matches!(err, StoreError::MalformedResponse { length: 10, .. }));
    }
}
