//! HTTP gateway (Axum) for recommendations and asset names.
//!
//! Used by the `assetrec` binary; the router is also driven directly in tests.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;

pub use error::{ErrorResponse, GatewayError};
pub use handler::{
    AssetNameResponse, RecommendQuery, RecommendationsResponse, asset_name_handler,
    recommendations_handler,
};
pub use state::HandlerState;

/// Response header carrying the outcome of every request.
pub const ASSETREC_STATUS_HEADER: &str = "x-assetrec-status";
pub const ASSETREC_STATUS_HEALTHY: &str = "healthy";
pub const ASSETREC_STATUS_READY: &str = "ready";
pub const ASSETREC_STATUS_NOT_READY: &str = "not_ready";
pub const ASSETREC_STATUS_OK: &str = "ok";

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route(
            "/v1/users/{user_id}/recommendations",
            get(recommendations_handler),
        )
        .route("/v1/assets/{item_id}", get(asset_name_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub(crate) fn status_headers(status: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ASSETREC_STATUS_HEADER, HeaderValue::from_static(status));
    headers
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub model: ModelStatus,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ModelStatus {
    pub state: String,
    pub n_users: Option<usize>,
    pub n_items: Option<usize>,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (
        StatusCode::OK,
        status_headers(ASSETREC_STATUS_HEALTHY),
        Json(HealthResponse {
            status: "ok".to_string(),
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<HandlerState>) -> Response {
    match state.context.get() {
        Some(context) => (
            StatusCode::OK,
            status_headers(ASSETREC_STATUS_READY),
            Json(ReadyResponse {
                status: "ok".to_string(),
                model: ModelStatus {
                    state: ASSETREC_STATUS_READY.to_string(),
                    n_users: Some(context.n_users()),
                    n_items: Some(context.n_items()),
                },
            }),
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            status_headers(ASSETREC_STATUS_NOT_READY),
            Json(ReadyResponse {
                status: "pending".to_string(),
                model: ModelStatus {
                    state: "loading".to_string(),
                    n_users: None,
                    n_items: None,
                },
            }),
        )
            .into_response(),
    }
}
