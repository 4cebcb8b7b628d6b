//! HTTP route handlers.
//!
//! Every route is a plain GET so the probes and counter can be driven with
//! `curl`. Responses carry `Cache-Control: no-store`; a cached probe answer
//! would hide the state the orchestrator is asking about.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod counter;
pub mod home;
pub mod live;
pub mod ready;

use axum::{middleware, routing::get, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::CACHE_CONTROL_NO_STORE;
use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let counter_routes = Router::new()
        .route("/counter", get(counter::count))
        .route("/counter/reset", get(counter::reset));

    // Liveness and readiness probes
    let probe_routes = Router::new()
        .route("/live", get(live::live))
        .route("/live/{delay}", get(live::set_delay))
        .route("/ready", get(ready::ready))
        .route("/ready/fail", get(ready::fail));

    Router::new()
        .route("/", get(home::index))
        .merge(counter_routes)
        .merge(probe_routes)
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ))
        .layer(TraceLayer::new_for_http())
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}
