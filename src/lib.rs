//! MotoPro Gateway Library
//!
//! Privileged API-proxy gateway behind the MotoPro dispatch dashboard.
//!
//! # Components
//!
//! - **Forwarder**: sole owner of outbound HTTP egress and the mutable
//!   remote base URL; single-attempt, envelope-returning
//! - **Bridge**: bearer-token custody with a one-shot refresh-and-retry
//!   on 401, de-duplicated across concurrent calls
//! - **Control surface**: local HTTP routes consumed by the embedded
//!   dashboard shell
//!
//! Application-level HTTP errors are data, not errors: callers receive a
//! `{status, data}` envelope for every remote outcome and inspect
//! `status` themselves. Only transport failures surface as [`Error`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber.with(fmt::layer().json()).init();
        }
        _ => {
            subscriber.with(fmt::layer()).init();
        }
    }

    Ok(())
}
