//! Authenticated proxy client with transparent session renewal
//!
//! The bridge wraps an [`ApiForwarder`] with bearer-token custody. Per
//! logical call it performs at most one refresh and at most one retry:
//!
//! ```text
//! attempt 1 ──(not 401, or no refresh token)──▶ final
//!     │
//!     401 + refresh token held
//!     ▼
//! refresh ──(non-200 or no access field)──▶ original 401 is final
//!     │
//!     200 {access}
//!     ▼
//! attempt 2 ──▶ final, whatever its status
//! ```
//!
//! Concurrent callers that observe 401 at the same time are de-duplicated
//! behind an async gate: whoever wins performs the refresh, the rest reuse
//! the rotated access token and go straight to their retry.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::tokens::TokenPair;
use crate::Result;
use crate::gateway::{ApiForwarder, ApiRequest, ApiResponse, HttpMethod};

const AUTHORIZATION: &str = "Authorization";

/// Token-holding proxy client in front of the forwarder
///
/// One instance per session; pass it explicitly to any code that issues
/// authenticated calls. There is no ambient global token state.
pub struct ApiBridge {
    /// Forwarding seam to the privileged side
    forwarder: Arc<dyn ApiForwarder>,
    /// In-memory token pair, never persisted here
    tokens: RwLock<TokenPair>,
    /// Remote login endpoint, e.g. `/token/`
    login_path: String,
    /// Remote refresh endpoint, e.g. `/token/refresh/`
    refresh_path: String,
    /// Serializes refresh attempts across concurrent 401s
    refresh_gate: Mutex<()>,
}

impl ApiBridge {
    /// Create a bridge over a forwarder
    #[must_use]
    pub fn new(
        forwarder: Arc<dyn ApiForwarder>,
        login_path: impl Into<String>,
        refresh_path: impl Into<String>,
    ) -> Self {
        Self {
            forwarder,
            tokens: RwLock::new(TokenPair::default()),
            login_path: login_path.into(),
            refresh_path: refresh_path.into(),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Replace both tokens. Pure assignment, no validation.
    pub fn set_tokens(&self, access: Option<String>, refresh: Option<String>) {
        let mut tokens = self.tokens.write();
        tokens.access = access;
        tokens.refresh = refresh;
    }

    /// Drop both tokens (logout support)
    pub fn clear_tokens(&self) {
        self.tokens.write().clear();
    }

    /// Current access token, if held
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.tokens.read().access.clone()
    }

    /// Whether a refresh token is currently held
    #[must_use]
    pub fn has_refresh_token(&self) -> bool {
        self.tokens.read().refresh.is_some()
    }

    /// Issue an authenticated request, refreshing the session once on 401.
    ///
    /// Holding no access token is legal: the call simply goes out
    /// unauthenticated. Every HTTP status comes back as an `Ok` envelope;
    /// only transport failures are errors.
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse> {
        let used_access = self.access_token();
        let first = self
            .forwarder
            .forward(self.authenticated(method, path, body.clone(), used_access.as_deref()))
            .await?;

        if first.status != 401 || !self.has_refresh_token() {
            return Ok(first);
        }

        // Unauthorized with a refresh token held: renew once, retry once.
        match self.refresh_access(used_access.as_deref()).await? {
            Some(new_access) => {
                let second = self
                    .forwarder
                    .forward(self.authenticated(method, path, body, Some(&new_access)))
                    .await?;
                Ok(second)
            }
            // Refresh failed: surface the original 401 untouched. Tokens
            // are kept; invalidating the session is the caller's call.
            None => Ok(first),
        }
    }

    /// Log in with email and password, storing both tokens on success.
    ///
    /// The envelope is returned either way so the caller can inspect a
    /// rejected login.
    pub async fn login(&self, email: &str, password: &str) -> Result<ApiResponse> {
        let response = self
            .request(
                HttpMethod::Post,
                &self.login_path,
                Some(json!({"email": email, "password": password})),
            )
            .await?;

        if response.status == 200 {
            let access = response.data.get("access").and_then(Value::as_str);
            let refresh = response.data.get("refresh").and_then(Value::as_str);
            if let (Some(access), Some(refresh)) = (access, refresh) {
                self.set_tokens(Some(access.to_string()), Some(refresh.to_string()));
                info!("Login succeeded, session tokens stored");
            } else {
                warn!("Login returned 200 without a token pair");
            }
        }

        Ok(response)
    }

    /// Renew the access token, de-duplicating concurrent refreshes.
    ///
    /// `stale` is the access token the caller's failed attempt used. If a
    /// different token is already in place once the gate is acquired,
    /// another caller refreshed first and that token is reused.
    ///
    /// Returns `Ok(None)` when the refresh endpoint rejects the renewal
    /// (non-200 or missing `access` field). The refresh token itself is
    /// never rotated here.
    async fn refresh_access(&self, stale: Option<&str>) -> Result<Option<String>> {
        let _gate = self.refresh_gate.lock().await;

        {
            let tokens = self.tokens.read();
            if let Some(ref current) = tokens.access {
                if stale != Some(current.as_str()) {
                    debug!("Reusing access token refreshed by a concurrent call");
                    return Ok(Some(current.clone()));
                }
            }
        }

        let Some(refresh) = self.tokens.read().refresh.clone() else {
            return Ok(None);
        };

        // The refresh goes through the same forwarding path, so it too can
        // fail at the transport level.
        let response = self
            .forwarder
            .forward(ApiRequest::post(
                self.refresh_path.clone(),
                json!({"refresh": refresh}),
            ))
            .await?;

        if response.status == 200 {
            if let Some(access) = response.data.get("access").and_then(Value::as_str) {
                self.tokens.write().access = Some(access.to_string());
                info!("Access token refreshed");
                return Ok(Some(access.to_string()));
            }
        }

        warn!(status = response.status, "Token refresh rejected");
        Ok(None)
    }

    /// Build the outgoing descriptor with a bearer header when a token is
    /// available.
    fn authenticated(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        access: Option<&str>,
    ) -> ApiRequest {
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        if let Some(token) = access {
            request = request.with_header(AUTHORIZATION, format!("Bearer {token}"));
        }
        request
    }
}
