//! Privileged gateway side
//!
//! Owns outbound HTTP egress, the mutable base URL, and the local control
//! surface exposed to the dispatch shell.

mod envelope;
mod forwarder;
pub mod router;
mod server;

pub use envelope::{ApiRequest, ApiResponse, HttpMethod, normalize_base_url, normalize_path};
pub use forwarder::{ApiForwarder, HttpForwarder};
pub use server::GatewayServer;
