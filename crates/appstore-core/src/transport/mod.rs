//! Transport layer module.

pub mod http;
pub mod mock;
pub mod traits;

pub use http::ReqwestTransport;
pub use mock::MockTransport;
pub use traits::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
