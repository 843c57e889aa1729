//! Request forwarding to the remote MotoPro API
//!
//! The forwarder is the sole owner of outbound HTTP egress. It is a
//! single-attempt component: no retries, no backoff, no token knowledge.
//! Session renewal policy lives one layer up, in
//! [`crate::auth::ApiBridge`].

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{
    Client,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde_json::Value;
use tracing::{debug, warn};

use super::envelope::{ApiRequest, ApiResponse, normalize_base_url, normalize_path};
use crate::config::{Config, DeallocationConfig, EstablishmentConfig};
use crate::{Error, Result};

/// The forwarding seam between the bridge and the network
///
/// [`crate::auth::ApiBridge`] depends on this trait rather than on the
/// concrete HTTP client, so tests can substitute a scripted double.
#[async_trait]
pub trait ApiForwarder: Send + Sync {
    /// Forward one request to the remote API and return its envelope.
    ///
    /// Every HTTP status, 4xx/5xx included, comes back as an `Ok`
    /// envelope. Only transport-level failures are errors.
    async fn forward(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// reqwest-backed forwarder holding the mutable base URL
pub struct HttpForwarder {
    /// HTTP client for outbound requests
    client: Client,
    /// Current base URL; replaced atomically by [`Self::set_base_url`]
    base_url: RwLock<String>,
    /// Read-only deallocation policy snapshot
    deallocation: DeallocationConfig,
    /// Read-only establishment snapshot
    establishment: EstablishmentConfig,
}

impl HttpForwarder {
    /// Create a forwarder from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL is empty or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = normalize_base_url(&config.api.base_url)
            .ok_or_else(|| Error::Config("api.base_url must not be empty".to_string()))?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.api.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: RwLock::new(base_url),
            deallocation: config.deallocation.clone(),
            establishment: config.establishment.clone(),
        })
    }

    /// Replace the base URL used by all subsequent forwards.
    ///
    /// The input is trimmed and trailing slashes are stripped. Empty or
    /// whitespace-only input is a no-op; this operation never fails.
    pub fn set_base_url(&self, url: &str) {
        match normalize_base_url(url) {
            Some(normalized) => {
                debug!(base_url = %normalized, "Base URL updated");
                *self.base_url.write() = normalized;
            }
            None => {
                debug!("Ignoring empty base URL update");
            }
        }
    }

    /// Current base URL
    #[must_use]
    pub fn base_url(&self) -> String {
        self.base_url.read().clone()
    }

    /// Read-only deallocation policy, assembled once at startup
    #[must_use]
    pub fn deallocation_config(&self) -> &DeallocationConfig {
        &self.deallocation
    }

    /// Read-only establishment defaults, assembled once at startup
    #[must_use]
    pub fn establishment_config(&self) -> &EstablishmentConfig {
        &self.establishment
    }

    /// Join a request path to the base URL at call time.
    /// The result is never cached: a base URL change applies immediately.
    fn effective_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.read(), normalize_path(path))
    }

    /// Merge gateway defaults under caller-supplied headers.
    /// Caller entries win; unparseable names or values are skipped.
    fn build_headers(request: &ApiRequest) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(ref caller_headers) = request.headers {
            for (name, value) in caller_headers {
                match (name.parse::<HeaderName>(), value.parse::<HeaderValue>()) {
                    (Ok(header_name), Ok(header_value)) => {
                        headers.insert(header_name, header_value);
                    }
                    _ => {
                        warn!(header = %name, "Skipping unparseable header");
                    }
                }
            }
        }

        if request.body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        headers
    }

    /// Serialize the body: JSON strings go out raw, everything else is
    /// JSON-stringified.
    fn serialize_body(body: &Value) -> Result<String> {
        match body {
            Value::String(raw) => Ok(raw.clone()),
            other => Ok(serde_json::to_string(other)?),
        }
    }
}

#[async_trait]
impl ApiForwarder for HttpForwarder {
    async fn forward(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.effective_url(&request.path);
        let headers = Self::build_headers(&request);

        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .headers(headers);

        if let Some(ref body) = request.body {
            builder = builder.body(Self::serialize_body(body)?);
        }

        // Transport failures propagate; HTTP statuses never do.
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        debug!(method = %request.method, path = %request.path, status, "Forwarded request");

        Ok(ApiResponse::from_text(status, text))
    }
}
