//! cloud-native-demo: a small service for demonstrating Kubernetes probes.
//!
//! Serves its configuration, a per-host visit counter kept in Redis, and
//! liveness/readiness endpoints whose behavior can be changed at runtime to
//! simulate a slow or unready instance.

pub mod config;
pub mod counter;
pub mod error;
pub mod http;
pub mod middleware;
pub mod probes;
pub mod routes;
pub mod state;
pub mod store;

pub use error::AppError;
pub use routes::create_router;
pub use state::{AppState, RuntimeEnv};
