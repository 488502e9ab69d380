// routes.rs - router assembly and the public service endpoints

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json},
    routing::{get, patch, post, MethodRouter},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::permissions;
use crate::database::manager::DatabaseManager;
use crate::handlers::{contracts, payments, traceability};
use crate::middleware::{authenticate, permission_guard, require_permission};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected API
        .merge(protected_routes(&state))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(traceability_routes())
        .merge(contract_routes())
        .merge(payment_routes())
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
}

fn traceability_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/traceability",
            guarded(post(traceability::create), permissions::CREATE_RECORD),
        )
        .route(
            "/traceability/:traceability_hash",
            guarded(get(traceability::show), permissions::VIEW_RECORD),
        )
}

fn contract_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/smart-contract",
            guarded(post(contracts::create), permissions::CREATE_CONTRACT),
        )
        .route(
            "/smart-contract/:contract_id",
            guarded(patch(contracts::update_status), permissions::UPDATE_CONTRACT),
        )
}

fn payment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/payments/lock",
            guarded(post(payments::lock), permissions::LOCK_PAYMENT),
        )
        .route(
            "/payments/release",
            guarded(post(payments::release), permissions::RELEASE_PAYMENT),
        )
}

/// Attach the uniform permission guard plus the route's declared permission.
fn guarded(routes: MethodRouter<AppState>, permission: &'static str) -> MethodRouter<AppState> {
    routes
        .route_layer(middleware::from_fn(permission_guard))
        .route_layer(require_permission(permission))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "FarmChain API",
        "version": version,
        "description": "Agricultural traceability and smart-contract service",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "traceability": "POST /traceability, GET /traceability/:traceability_hash (protected)",
            "smart_contract": "POST /smart-contract, PATCH /smart-contract/:contract_id (protected)",
            "payments": "POST /payments/lock, POST /payments/release (protected, not yet implemented)"
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database": "unavailable",
                "error": e.to_string()
            })),
        ),
    }
}
