//! Protocol module - wire format and constants of the purchase API.

pub mod codec;
pub mod constants;

pub use codec::{PlistValue, RequestPayload, ResponseMapping, decode, encode};
pub use constants::*;
