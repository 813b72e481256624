use std::time::Instant;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use super::error::GatewayError;
use super::state::HandlerState;
use super::{ASSETREC_STATUS_OK, status_headers};
use crate::ranking::Recommendation;

#[derive(Debug, Default, Deserialize)]
pub struct RecommendQuery {
    /// Signed so that `k <= 0` reaches the handler and yields an empty list.
    pub k: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub request_id: String,
    pub user_id: String,
    pub k: usize,
    /// RFC 3339 timestamp.
    pub generated_at: String,
    pub items: Vec<Recommendation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssetNameResponse {
    pub item_id: String,
    pub display_name: String,
    pub in_catalog: bool,
}

#[instrument(skip(state, query), fields(k = tracing::field::Empty))]
pub async fn recommendations_handler(
    State(state): State<HandlerState>,
    Path(user_id): Path<String>,
    query: Result<Query<RecommendQuery>, QueryRejection>,
) -> Result<Response, GatewayError> {
    let Query(query) = query.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    let k = resolve_k(query.k, state.default_top_k, state.max_top_k)?;
    tracing::Span::current().record("k", k);

    let context = state.context.get().ok_or(GatewayError::NotReady)?;

    let started = Instant::now();
    let options = state
        .rank_options
        .deadline(started + state.request_timeout);
    let user_key = user_id.clone();
    let items = tokio::task::spawn_blocking(move || context.recommend(&user_key, k, &options))
        .await
        .map_err(|e| {
            error!(error = %e, "Scoring task failed");
            GatewayError::InternalError(format!("scoring task failed: {e}"))
        })??;

    info!(
        returned = items.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Recommendations served"
    );

    let body = RecommendationsResponse {
        request_id: format!("rec-{}", uuid::Uuid::new_v4()),
        user_id,
        k,
        generated_at: Utc::now().to_rfc3339(),
        items,
    };
    Ok((StatusCode::OK, status_headers(ASSETREC_STATUS_OK), Json(body)).into_response())
}

#[instrument(skip(state))]
pub async fn asset_name_handler(
    State(state): State<HandlerState>,
    Path(item_id): Path<String>,
) -> Result<Response, GatewayError> {
    let context = state.context.get().ok_or(GatewayError::NotReady)?;

    let in_catalog = context.items().contains(&item_id);
    let display_name = context.resolve_name(&item_id).to_string();
    debug!(in_catalog, "Asset name resolved");

    let body = AssetNameResponse {
        item_id,
        display_name,
        in_catalog,
    };
    Ok((StatusCode::OK, status_headers(ASSETREC_STATUS_OK), Json(body)).into_response())
}

/// `requested` or the default, floored at 0 and rejected above `max`.
pub(crate) fn resolve_k(
    requested: Option<i64>,
    default: usize,
    max: usize,
) -> Result<usize, GatewayError> {
    let k = match requested {
        None => default,
        Some(k) if k <= 0 => 0,
        Some(k) => usize::try_from(k).unwrap_or(usize::MAX),
    };
    if k > max {
        return Err(GatewayError::InvalidRequest(format!(
            "k={k} exceeds the maximum of {max}"
        )));
    }
    Ok(k)
}
