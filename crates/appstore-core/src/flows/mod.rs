//! Protocol flows built on the store client.
//!
//! - `auth`: login and credential creation
//! - `download`: download negotiation
//! - `search`: public catalog search

pub mod auth;
pub mod download;
pub mod search;

pub use auth::LoginOptions;
pub use download::NegotiationResult;
pub use search::{AppItem, SearchOptions};
