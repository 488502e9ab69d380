// Shared helpers for in-crate tests: a stub authorization service and an
// AppState whose pool never needs a live database.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};

use crate::auth::client::AuthClient;
use crate::config::AppConfig;
use crate::state::AppState;

/// Counts validation calls so tests can assert when no outbound call happened.
#[derive(Clone, Default)]
pub struct ValidationCounter(Arc<AtomicUsize>);

impl ValidationCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Serve a stub authorization service answering `status` + `body` for every
/// validation request. Returns its base URL.
pub async fn spawn_auth_stub(status: StatusCode, body: Value, counter: ValidationCounter) -> String {
    let app = Router::new().route(
        "/auth/public/validate",
        post(move || {
            let body = body.clone();
            let counter = counter.clone();
            async move {
                counter.0.fetch_add(1, Ordering::SeqCst);
                (status, Json(body))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind auth stub");
    let addr = listener.local_addr().expect("auth stub addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("auth stub");
    });

    format!("http://{}", addr)
}

/// AppState for tests. The pool is lazy and points at nothing, so any code
/// path that reaches the store fails; tests use it for paths that must
/// resolve before persistence.
pub fn state_with_auth(auth_base_url: &str) -> AppState {
    let mut config = AppConfig::from_env();
    config.auth.base_url = auth_base_url.to_string();

    let db = sqlx::PgPool::connect_lazy("postgres://postgres@127.0.0.1:5432/farmchain_test")
        .expect("lazy test pool");
    let auth = AuthClient::new(auth_base_url, Duration::from_secs(2)).expect("test auth client");

    AppState::new(config, db, auth)
}

pub fn claims_body(permissions: &[&str]) -> Value {
    json!({ "permissions": permissions })
}
