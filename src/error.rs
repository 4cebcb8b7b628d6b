use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Backing store failure the handler chose to report as an outage
    #[error("Backing store unavailable: {0}")]
    StoreUnavailable(StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Surface a store failure without classifying it, as a generic 500.
    pub fn uncaught(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::StoreUnavailable(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::StoreUnavailable(err) => {
                tracing::warn!(error = %err, "Backing store unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "service unavailable")
            }
            AppError::Internal(_) => {
                tracing::error!("Internal error: {:?}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
