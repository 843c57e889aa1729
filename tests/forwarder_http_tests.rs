//! HttpForwarder round-trips against a local test API
//!
//! Spins a real axum server on an ephemeral port and drives the reqwest
//! forwarder through it: body serialization, header defaults, path
//! normalization, envelope degradation, and transport-failure surfacing.

use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use motopro_gateway::config::Config;
use motopro_gateway::gateway::{ApiForwarder, ApiRequest, HttpForwarder};

/// Start a fixture API resembling the remote MotoPro backend
async fn spawn_remote() -> SocketAddr {
    let app = Router::new()
        .route(
            "/api/v1/vagas/{id}",
            get(|Path(id): Path<u32>| async move {
                Json(json!({"id": id, "estabelecimento": "Mister X CB", "status": "aberta"}))
            }),
        )
        .route("/api/v1/echo", post(echo_handler))
        .route("/api/v1/headers", get(headers_handler))
        .route(
            "/api/v1/html",
            get(|| async { (StatusCode::BAD_GATEWAY, "<html>error</html>") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Echo back the received content type and body
async fn echo_handler(headers: HeaderMap, body: String) -> Json<Value> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let parsed: Value = serde_json::from_str(&body).unwrap_or(Value::String(body));
    Json(json!({"content_type": content_type, "body": parsed}))
}

/// Report selected request headers back to the caller
async fn headers_handler(headers: HeaderMap) -> Json<Value> {
    let get = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };
    Json(json!({"accept": get("accept"), "authorization": get("authorization")}))
}

fn forwarder_for(addr: SocketAddr) -> HttpForwarder {
    let mut config = Config::default();
    config.api.base_url = format!("http://{addr}/api/v1");
    HttpForwarder::new(&config).unwrap()
}

#[tokio::test]
async fn object_body_round_trips_as_json() {
    let addr = spawn_remote().await;
    let fwd = forwarder_for(addr);

    let payload = json!({"vaga_id": 501, "turno": "Noite", "alocados": [1, 2]});
    let response = fwd
        .forward(ApiRequest::post("/echo", payload.clone()))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.data["content_type"], "application/json");
    // The remote reconstructed the same object from the wire bytes.
    assert_eq!(response.data["body"], payload);
}

#[tokio::test]
async fn string_body_is_sent_verbatim() {
    let addr = spawn_remote().await;
    let fwd = forwarder_for(addr);

    let response = fwd
        .forward(ApiRequest::post("/echo", json!("plain text payload")))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.data["body"], json!("plain text payload"));
}

#[tokio::test]
async fn leading_slash_is_optional_in_paths() {
    let addr = spawn_remote().await;
    let fwd = forwarder_for(addr);

    let with_slash = fwd.forward(ApiRequest::get("/vagas/501")).await.unwrap();
    let without_slash = fwd.forward(ApiRequest::get("vagas/501")).await.unwrap();

    assert_eq!(with_slash.status, 200);
    assert_eq!(with_slash, without_slash);
    assert_eq!(with_slash.data["id"], 501);
}

#[tokio::test]
async fn accept_json_is_sent_by_default_and_bearer_passes_through() {
    let addr = spawn_remote().await;
    let fwd = forwarder_for(addr);

    let request =
        ApiRequest::get("/headers").with_header("Authorization", "Bearer T1");
    let response = fwd.forward(request).await.unwrap();

    assert_eq!(response.data["accept"], "application/json");
    assert_eq!(response.data["authorization"], "Bearer T1");
}

#[tokio::test]
async fn non_json_error_body_degrades_to_raw_text() {
    let addr = spawn_remote().await;
    let fwd = forwarder_for(addr);

    let response = fwd.forward(ApiRequest::get("/html")).await.unwrap();

    // 5xx is an envelope, never an Err.
    assert_eq!(response.status, 502);
    assert_eq!(response.data, json!("<html>error</html>"));
}

#[tokio::test]
async fn unknown_path_is_an_envelope_too() {
    let addr = spawn_remote().await;
    let fwd = forwarder_for(addr);

    let response = fwd.forward(ApiRequest::get("/nada/")).await.unwrap();
    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn unreachable_remote_is_a_hard_failure() {
    // Reserve a port, then free it so nothing listens there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fwd = forwarder_for(addr);
    let result = fwd.forward(ApiRequest::get("/vagas/1")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn base_url_update_applies_to_subsequent_requests() {
    let addr = spawn_remote().await;

    // Start against a dead port, then point at the live fixture.
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = dead.local_addr().unwrap();
    drop(dead);

    let fwd = forwarder_for(dead_addr);
    assert!(fwd.forward(ApiRequest::get("/vagas/501")).await.is_err());

    fwd.set_base_url(&format!("http://{addr}/api/v1/"));
    let response = fwd.forward(ApiRequest::get("/vagas/501")).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(fwd.base_url(), format!("http://{addr}/api/v1"));
}
