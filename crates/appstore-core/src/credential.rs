//! Session credential types and persistence.
//!
//! A credential is produced whole by a successful login, or restored whole
//! from a credential file. It has no setters: nothing observes a partially
//! initialised credential.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::storefront;

/// HTTP cookie captured from the login response.
///
/// Field names follow the credential files written by earlier releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Path", default)]
    pub path: String,
    #[serde(rename = "Domain", default)]
    pub domain: String,
    #[serde(rename = "Expires", default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    #[serde(rename = "Secure", default)]
    pub secure: bool,
    #[serde(rename = "HttpOnly", default)]
    pub http_only: bool,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: String::new(),
            domain: String::new(),
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    pub(crate) fn from_reqwest(cookie: &reqwest::cookie::Cookie<'_>) -> Self {
        Self {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
            path: cookie.path().unwrap_or_default().to_string(),
            domain: cookie.domain().unwrap_or_default().to_string(),
            expires: cookie.expires().map(DateTime::<Utc>::from),
            secure: cookie.secure(),
            http_only: cookie.http_only(),
        }
    }

    /// `name=value`, as sent in a `Cookie` header.
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Identity and session materials of a logged-in account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredential {
    /// Account handle as resolved by the server.
    #[serde(rename = "apple_id")]
    account_id: String,
    password: String,
    #[serde(rename = "password_token")]
    session_token: String,
    /// Numeric account identity, sent on every authenticated request.
    #[serde(rename = "dsid")]
    account_numeric_id: String,
    /// ISO 3166-1 alpha-2 region.
    region: String,
    /// Lower-case hex device identifier.
    #[serde(rename = "guid")]
    device_id: String,
    #[serde(default)]
    cookies: Vec<SessionCookie>,
}

impl SessionCredential {
    pub(crate) fn new(
        account_id: String,
        password: String,
        session_token: String,
        account_numeric_id: String,
        region: String,
        device_id: String,
        cookies: Vec<SessionCookie>,
    ) -> Self {
        Self {
            account_id,
            password,
            session_token,
            account_numeric_id,
            region,
            device_id,
            cookies,
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    pub fn account_numeric_id(&self) -> &str {
        &self.account_numeric_id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn cookies(&self) -> &[SessionCookie] {
        &self.cookies
    }

    /// Storefront code for the credential's region.
    pub fn storefront(&self) -> &'static str {
        storefront::resolve(&self.region)
    }

    /// Value of the `Cookie` header replaying every session cookie in order.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(SessionCookie::pair)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Load a credential file written by [`save`](Self::save).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let credential: SessionCredential = serde_json::from_slice(&data)?;
        debug!(path = %path.display(), account = %credential.account_id, "Loaded credential");
        Ok(credential)
    }

    /// Write the credential as JSON, readable by the owning user only.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        let data = serde_json::to_vec(self)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path)?;
        // mode() only applies on creation
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(&data)?;
        file.flush()?;

        info!(path = %path.display(), "Credential saved");
        Ok(())
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("account_id", &self.account_id)
            .field("password", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("account_numeric_id", &self.account_numeric_id)
            .field("region", &self.region)
            .field("device_id", &self.device_id)
            .field("cookies", &self.cookies.len())
            .finish()
    }
}
