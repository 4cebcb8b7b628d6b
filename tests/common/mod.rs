//! Shared helpers for driving the router in-process.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use cloud_native_demo::config::AppConfig;
use cloud_native_demo::store::MemoryStore;
use cloud_native_demo::{create_router, AppState, RuntimeEnv};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;

/// Router backed by an in-memory store, with handles to poke at both.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

impl TestApp {
    pub fn new(hostname: &str) -> Self {
        Self::with(AppConfig::default(), RuntimeEnv::with_hostname(hostname))
    }

    pub fn with(config: AppConfig, env: RuntimeEnv) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, store.clone(), env);
        Self {
            router: create_router(state.clone()),
            store,
            state,
        }
    }

    /// Another instance sharing this app's store, as a second pod would.
    pub fn sibling(&self, hostname: &str) -> TestApp {
        let state = AppState::new(
            AppConfig::default(),
            self.store.clone(),
            RuntimeEnv::with_hostname(hostname),
        );
        TestApp {
            router: create_router(state.clone()),
            store: self.store.clone(),
            state,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body: bytes.to_vec(),
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Failed to parse response")
    }
}
