//! Authentication flow.
//!
//! Unauthenticated -> InFlight -> Authenticated | Failed. A login is one
//! shot per client and is never retried internally.

use std::fmt;

use tracing::{info, instrument};

use crate::client::StoreClient;
use crate::credential::SessionCredential;
use crate::device;
use crate::error::StoreError;
use crate::events::{StoreEvent, StoreObserver};
use crate::protocol::constants::*;
use crate::protocol::{RequestPayload, decode, encode};
use crate::state::AuthPhase;
use crate::transport::{HttpRequest, HttpTransport};

/// Caller input for a login.
#[derive(Clone, Default)]
pub struct LoginOptions {
    /// Account handle, usually an email address.
    pub account_id: String,
    pub password: String,
    /// Hardware address to present as the device. Resolved from the local
    /// network interfaces when absent.
    pub mac_address: Option<String>,
    /// ISO 3166-1 alpha-2 region, "US" when absent.
    pub region: Option<String>,
}

impl LoginOptions {
    pub fn new(account_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    pub fn mac_address(mut self, mac: impl Into<String>) -> Self {
        self.mac_address = Some(mac.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

impl fmt::Debug for LoginOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginOptions")
            .field("account_id", &self.account_id)
            .field("password", &"<redacted>")
            .field("mac_address", &self.mac_address)
            .field("region", &self.region)
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Login request body.
pub(crate) fn login_payload(account_id: &str, password: &str, device_id: &str) -> RequestPayload {
    RequestPayload::new()
        .with(FIELD_APPLE_ID, account_id)
        .with(FIELD_ATTEMPT, LOGIN_ATTEMPT)
        .with(FIELD_PASSWORD, password)
        .with(FIELD_CREATE_SESSION, LOGIN_CREATE_SESSION)
        .with(FIELD_GUID, device_id)
        .with(FIELD_RMP, LOGIN_RMP)
        .with(FIELD_WHY, LOGIN_WHY)
}

impl<T: HttpTransport, O: StoreObserver> StoreClient<T, O> {
    /// Log in and attach the resulting credential to this client.
    ///
    /// Fails with [`StoreError::AlreadyAuthenticated`] if a credential is
    /// already attached. On failure the client stays unauthenticated.
    #[instrument(skip(self, options), fields(account = %options.account_id))]
    pub fn login(&mut self, options: LoginOptions) -> Result<(), StoreError> {
        if self.state.is_authenticated() {
            return Err(self.fail(StoreError::AlreadyAuthenticated));
        }

        self.emit(StoreEvent::PhaseChanged {
            from: AuthPhase::Unauthenticated,
            to: AuthPhase::InFlight,
        });

        match self.authenticate(&options) {
            Ok(credential) => {
                let account_id = credential.account_id().to_string();
                self.state.attach(credential);
                self.emit(StoreEvent::PhaseChanged {
                    from: AuthPhase::InFlight,
                    to: AuthPhase::Authenticated,
                });
                self.emit(StoreEvent::Authenticated { account_id });
                Ok(())
            }
            Err(e) => {
                self.emit(StoreEvent::PhaseChanged {
                    from: AuthPhase::InFlight,
                    to: AuthPhase::Failed,
                });
                Err(self.fail(e))
            }
        }
    }

    fn authenticate(&self, options: &LoginOptions) -> Result<SessionCredential, StoreError> {
        let device_id = match non_empty(options.mac_address.as_deref()) {
            Some(mac) => device::normalize_device_id(mac),
            None => device::resolve_system()?,
        };
        let region = non_empty(options.region.as_deref())
            .unwrap_or(DEFAULT_REGION)
            .to_string();

        let payload = login_payload(&options.account_id, &options.password, &device_id);
        let request = HttpRequest::post(self.config().endpoints.authenticate.as_str())
            .query(QUERY_GUID, device_id.as_str())
            .query(QUERY_POD, ROUTING_POD)
            .query(QUERY_PRH, ROUTING_PRH)
            .body(encode(&payload)?, PLIST_CONTENT_TYPE);

        let response = self.send(request)?;
        let data = decode(&response.body)?;

        let account_id = data
            .require_str(&[RESPONSE_ACCOUNT_INFO, RESPONSE_APPLE_ID])?
            .to_string();
        let session_token = data.require_str(&[RESPONSE_PASSWORD_TOKEN])?.to_string();
        let account_numeric_id = data.require_str(&[RESPONSE_DS_PERSON_ID])?.to_string();

        info!(
            account = %account_id,
            region = %region,
            cookies = response.cookies.len(),
            "Login accepted"
        );

        Ok(SessionCredential::new(
            account_id,
            options.password.clone(),
            session_token,
            account_numeric_id,
            region,
            device_id,
            response.cookies,
        ))
    }
}
