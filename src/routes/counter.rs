//! Handlers for the per-host counter.

use axum::{extract::State, Json};
use tracing::instrument;

use crate::counter;
use crate::error::AppError;
use crate::store::{FieldMap, StoreError};
use crate::state::AppState;

/// Count a visit from this instance and return all hosts' counts.
///
/// Counts are JSON integers (`{"pod-a": 3}`), not the decoded Redis strings
/// (`{"pod-a": "3"}`) a string-typed client would echo back.
/// Any store failure becomes a 503.
#[instrument(name = "counter::count", skip(state))]
pub async fn count(State(state): State<AppState>) -> Result<Json<FieldMap>, AppError> {
    let host = state.env.hostname.as_deref().ok_or_else(|| {
        StoreError::Unavailable("HOSTNAME is not set, no counter key".to_string())
    })?;

    let counts = counter::record_visit(
        state.store.as_ref(),
        host,
        state.config.counter.atomic_increment,
    )
    .await?;

    tracing::debug!(host, count = ?counts.get(host), "Counted visit");
    Ok(Json(counts))
}

/// Clear every host's count.
///
/// Store failures are not classified here and surface as a 500.
#[instrument(name = "counter::reset", skip(state))]
pub async fn reset(State(state): State<AppState>) -> Result<Json<FieldMap>, AppError> {
    let remaining = counter::reset(state.store.as_ref())
        .await
        .map_err(AppError::uncaught)?;
    Ok(Json(remaining))
}
