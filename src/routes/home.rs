//! Handler for the application configuration page.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::instrument;

use crate::config::{APP_NAME, APP_VERSION};
use crate::state::AppState;

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct AppInfo {
    #[serde(rename = "appName")]
    pub app_name: &'static str,
    pub version: &'static str,
    #[serde(rename = "redis-host")]
    pub redis_host: String,
    pub env: EnvInfo,
}

/// Unset variables serialize as `null`.
#[derive(Debug, Serialize)]
pub struct EnvInfo {
    pub host: Option<String>,
    pub user_defined_1: Option<String>,
    pub user_defined_2: Option<String>,
    pub user_defined_3: Option<String>,
}

/// Report configuration details.
///
/// Exposing this is fine for a demo and a bad idea anywhere else.
#[instrument(name = "home::index", skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<AppInfo> {
    let env = &state.env;
    Json(AppInfo {
        app_name: APP_NAME,
        version: APP_VERSION,
        redis_host: state.config.redis.host.clone(),
        env: EnvInfo {
            host: env.hostname.clone(),
            user_defined_1: env.user_defined_1.clone(),
            user_defined_2: env.user_defined_2.clone(),
            user_defined_3: env.user_defined_3.clone(),
        },
    })
}
