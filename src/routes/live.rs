//! Liveness probe endpoints.
//!
//! `GET /live` answers after sleeping for the configured delay, which lets a
//! demo push the probe past its timeout and watch the orchestrator restart the
//! container. `GET /live/{delay}` changes that delay.

use std::time::Duration;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::instrument;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DelayResponse {
    pub delay: u64,
}

/// Liveness handler.
///
/// Only this request waits; other requests keep being served. The delay is
/// read again after the sleep, so a change made meanwhile shows in the body.
#[instrument(name = "live::live", skip(state))]
pub async fn live(State(state): State<AppState>) -> Json<DelayResponse> {
    let delay = state.probes.liveness_delay();
    if delay > 0 {
        tracing::debug!(delay, "Delaying liveness response");
        tokio::time::sleep(Duration::from_secs(delay)).await;
    }

    Json(DelayResponse {
        delay: state.probes.liveness_delay(),
    })
}

/// Set the liveness delay in seconds.
///
/// The segment must be plain ASCII digits that fit in a `u64`; anything else,
/// including a sign, is treated as an unknown route. No upper bound is applied.
#[instrument(name = "live::set_delay", skip(state, delay))]
pub async fn set_delay(
    State(state): State<AppState>,
    delay: Result<Path<String>, PathRejection>,
) -> Response {
    let Some(delay) = delay.ok().and_then(|Path(raw)| parse_delay(&raw)) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    state.probes.set_liveness_delay(delay);
    tracing::info!(delay, "Liveness delay updated");

    Json(DelayResponse {
        delay: state.probes.liveness_delay(),
    })
    .into_response()
}

fn parse_delay(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
