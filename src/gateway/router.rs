//! HTTP router and handlers for the local control surface
//!
//! The dispatch shell talks to the gateway exclusively through these
//! routes. Forwarded envelopes always come back with HTTP 200 regardless
//! of the remote status; the remote status travels inside the envelope.
//! The only non-200 answer from `/api/request` is a 502 when the remote
//! API is unreachable at the transport level.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use super::envelope::HttpMethod;
use super::forwarder::HttpForwarder;
use crate::auth::ApiBridge;

/// Shared application state
pub struct AppState {
    /// Session bridge issuing authenticated calls
    pub bridge: Arc<ApiBridge>,
    /// Concrete forwarder, for base-URL control and config snapshots
    pub forwarder: Arc<HttpForwarder>,
}

/// Create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/request", post(proxy_handler))
        .route("/api/base-url", put(set_base_url_handler))
        .route(
            "/session/tokens",
            post(set_tokens_handler).delete(clear_tokens_handler),
        )
        .route("/session/login", post(login_handler))
        .route("/config/deallocation", get(deallocation_config_handler))
        .route("/config/establishment", get(establishment_config_handler))
        // The shell runs in an embedded browser on another local origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Body of `POST /api/request`
#[derive(Debug, Deserialize)]
pub struct ProxyRequestBody {
    /// HTTP method for the remote call (defaults to GET)
    #[serde(default)]
    pub method: HttpMethod,
    /// Path relative to the current base URL
    pub path: String,
    /// Optional JSON body
    #[serde(default)]
    pub body: Option<Value>,
}

/// POST /api/request - forward a call through the session bridge
async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProxyRequestBody>,
) -> impl IntoResponse {
    match state
        .bridge
        .request(request.method, &request.path, request.body)
        .await
    {
        Ok(envelope) => (StatusCode::OK, Json(json!(envelope))),
        Err(e) => {
            error!(method = %request.method, path = %request.path, error = %e, "Forwarding failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": e.to_string()})),
            )
        }
    }
}

/// Body of `PUT /api/base-url`
#[derive(Debug, Deserialize)]
struct BaseUrlBody {
    url: String,
}

/// PUT /api/base-url - replace the remote base URL
///
/// Always answers `true`: empty input is silently ignored, matching the
/// forwarder's no-op contract.
async fn set_base_url_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BaseUrlBody>,
) -> Json<bool> {
    state.forwarder.set_base_url(&body.url);
    Json(true)
}

/// Body of `POST /session/tokens`
#[derive(Debug, Deserialize)]
struct TokensBody {
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
}

/// POST /session/tokens - replace the session token pair
async fn set_tokens_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TokensBody>,
) -> Json<bool> {
    state.bridge.set_tokens(body.access, body.refresh);
    Json(true)
}

/// DELETE /session/tokens - drop the session token pair
async fn clear_tokens_handler(State(state): State<Arc<AppState>>) -> Json<bool> {
    state.bridge.clear_tokens();
    Json(true)
}

/// Body of `POST /session/login`
#[derive(Debug, Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

/// POST /session/login - authenticate and store the returned token pair
async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginBody>,
) -> impl IntoResponse {
    match state.bridge.login(&body.email, &body.password).await {
        Ok(envelope) => (StatusCode::OK, Json(json!(envelope))),
        Err(e) => {
            error!(error = %e, "Login forwarding failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": e.to_string()})),
            )
        }
    }
}

/// GET /config/deallocation - read-only deallocation policy snapshot
async fn deallocation_config_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!(state.forwarder.deallocation_config()))
}

/// GET /config/establishment - read-only establishment snapshot
async fn establishment_config_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!(state.forwarder.establishment_config()))
}
