use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::{ASSETREC_STATUS_NOT_READY, status_headers};
use crate::ranking::RecommendError;
use crate::scoring::ScoringError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("model is still loading")]
    NotReady,

    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("scoring failed: {0}")]
    ScoringFailed(#[from] ScoringError),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<RecommendError> for GatewayError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::UserNotFound { user_key } => GatewayError::UserNotFound(user_key),
            RecommendError::Timeout { .. } => GatewayError::Timeout(err.to_string()),
            RecommendError::Scoring(e) => GatewayError::ScoringFailed(e),
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::UserNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::ScoringFailed(_) | GatewayError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Value of the status header for this error.
    pub fn status_tag(&self) -> &'static str {
        match self {
            GatewayError::InvalidRequest(_) => "invalid_request",
            GatewayError::NotReady => ASSETREC_STATUS_NOT_READY,
            GatewayError::UserNotFound(_) => "user_not_found",
            GatewayError::Timeout(_) => "timeout",
            GatewayError::ScoringFailed(_) => "scoring_error",
            GatewayError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, status_headers(self.status_tag()), body).into_response()
    }
}
