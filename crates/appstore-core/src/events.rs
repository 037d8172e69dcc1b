//! Event system for UI decoupling.
//!
//! Allows the CLI (or any other front end) to follow protocol activity
//! without tight coupling to the client.

use crate::state::AuthPhase;
use crate::transport::HttpMethod;

/// Events emitted by the store client.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// Authentication phase changed.
    PhaseChanged { from: AuthPhase, to: AuthPhase },
    /// Request handed to the transport.
    RequestSent { method: HttpMethod, url: String },
    /// Response received, before status classification.
    ResponseReceived { status: u16, length: usize },
    /// Login succeeded.
    Authenticated { account_id: String },
    /// A flow failed.
    Error { kind: &'static str, message: String },
}

/// Observer trait for receiving store events.
///
/// Implement this trait in your UI layer to receive updates.
pub trait StoreObserver: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &StoreEvent);
}

/// No-op observer that discards all events.
pub struct NullObserver;

impl StoreObserver for NullObserver {
    fn on_event(&self, _event: &StoreEvent) {}
}

/// Observer that logs events using tracing.
pub struct TracingObserver;

impl StoreObserver for TracingObserver {
    fn on_event(&self, event: &StoreEvent) {
        match event {
            StoreEvent::PhaseChanged { from, to } => {
                tracing::info!(from = %from, to = %to, "Phase changed");
            }
            StoreEvent::RequestSent { method, url } => {
                tracing::debug!(method = %method, url = %url, "Request sent");
            }
            StoreEvent::ResponseReceived { status, length } => {
                tracing::debug!(status = status, len = length, "Response received");
            }
            StoreEvent::Authenticated { account_id } => {
                tracing::info!(account = %account_id, "Authenticated");
            }
            StoreEvent::Error { kind, message } => {
                tracing::error!(kind = kind, "Error: {}", message);
            }
        }
    }
}
