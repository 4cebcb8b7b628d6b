//! HTTP server lifecycle.
//!
//! Serves plain HTTP; TLS is terminated by the cluster ingress in front of
//! the service. SIGTERM/SIGINT trigger a graceful shutdown so a pod being
//! replaced finishes its in-flight requests.

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
