//! Readiness probe endpoints.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use tracing::instrument;

use crate::probes::ReadinessOutcome;
use crate::state::AppState;

/// Readiness handler: ready when the key-value store answers a ping.
///
/// A forced failure from `/ready/fail` is checked first and then overruled by
/// the store check, so it only shows up as a 503 when the store is down too.
#[instrument(name = "ready::ready", skip(state))]
pub async fn ready(State(state): State<AppState>) -> Response {
    let store_up = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, backend = state.store.backend(), "Store ping failed");
            false
        }
    };

    let outcome = ReadinessOutcome::evaluate(state.probes.readiness_pass(), store_up);
    (outcome.status(), Json(outcome.body())).into_response()
}

/// Make readiness fail for the rest of the process lifetime.
///
/// Nothing is returned, so the response is whatever axum sends for `()`:
/// currently 200 with an empty body and no content type. Callers should not
/// rely on that status.
#[instrument(name = "ready::fail", skip(state))]
pub async fn fail(State(state): State<AppState>) {
    state.probes.force_readiness_failure();
    tracing::warn!("Readiness forced to fail until restart");
}
