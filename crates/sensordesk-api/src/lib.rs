// sensordesk-api: Async HTTP transport for the sensordesk REST API

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::RestClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{ErrorDescriptor, JsonObject};
