//! appstore-core: client for the App Store configurator purchase protocol.
//!
//! Authenticates an account, keeps the resulting session materials, and
//! negotiates signed download URLs for catalog items. Requests and responses
//! are binary property lists.
//!
//! # Architecture
//!
//! The crate is organized into layers:
//!
//! - **Protocol**: Constants and the binary plist codec
//! - **Transport**: HTTP abstraction (reqwest, mock)
//! - **State**: Authentication phases and the credential slot
//! - **Events**: Observer pattern for UI decoupling
//! - **Client**: Header injection and status classification
//! - **Flows**: Login, download negotiation, catalog search
//! - **Device**: Device identifier from network hardware
//! - **Storefront**: Region to storefront code mapping
//!
//! # Example
//!
//! ```no_run
//! use appstore_core::{ClientConfig, LoginOptions, StoreClient};
//!
//! let mut client = StoreClient::new(ClientConfig::default())?;
//! client.login(LoginOptions::new("user@example.com", "password"))?;
//! let result = client.negotiate_download("284882215")?;
//! println!("{}", result.to_json());
//! # Ok::<(), appstore_core::StoreError>(())
//! ```

pub mod client;
pub mod config;
pub mod credential;
pub mod device;
pub mod error;
pub mod events;
pub mod flows;
pub mod protocol;
pub mod state;
pub mod storefront;
pub mod transport;

// Re-exports for convenience
pub use client::StoreClient;
pub use config::{ClientConfig, Endpoints};
pub use credential::{SessionCookie, SessionCredential};
pub use error::StoreError;
pub use events::{NullObserver, StoreEvent, StoreObserver, TracingObserver};
pub use flows::{AppItem, LoginOptions, NegotiationResult, SearchOptions};
pub use protocol::{PlistValue, RequestPayload, ResponseMapping};
pub use state::{AuthPhase, SessionState};
pub use transport::{HttpTransport, MockTransport, ReqwestTransport, TransportError};
