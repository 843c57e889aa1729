//! Session authentication
//!
//! Token custody and transparent refresh-and-retry on top of the
//! forwarding layer.

mod bridge;
mod tokens;

pub use bridge::ApiBridge;
pub use tokens::TokenPair;
