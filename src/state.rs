//! Shared application state for request handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::probes::HealthProbes;
use crate::store::KeyValueStore;

/// Environment variables surfaced by the service.
#[derive(Debug, Clone, Default)]
pub struct RuntimeEnv {
    /// Identity of this instance; the counter key
    pub hostname: Option<String>,
    pub user_defined_1: Option<String>,
    pub user_defined_2: Option<String>,
    pub user_defined_3: Option<String>,
}

impl RuntimeEnv {
    /// Snapshot the relevant variables from the process environment.
    pub fn from_process() -> Self {
        Self {
            hostname: std::env::var("HOSTNAME").ok(),
            user_defined_1: std::env::var("USER_DEFINED_1").ok(),
            user_defined_2: std::env::var("USER_DEFINED_2").ok(),
            user_defined_3: std::env::var("USER_DEFINED_3").ok(),
        }
    }

    /// Environment with only a hostname set.
    pub fn with_hostname(hostname: impl Into<String>) -> Self {
        Self {
            hostname: Some(hostname.into()),
            ..Self::default()
        }
    }
}

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Everything a handler touches is injected here, so tests can build a state
/// around an in-memory store and a chosen environment.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn KeyValueStore>,
    pub probes: Arc<HealthProbes>,
    pub env: Arc<RuntimeEnv>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn KeyValueStore>, env: RuntimeEnv) -> Self {
        Self {
            config: Arc::new(config),
            store,
            probes: Arc::new(HealthProbes::default()),
            env: Arc::new(env),
        }
    }
}
