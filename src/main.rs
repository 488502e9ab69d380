use std::time::Duration;

use farmchain_api::auth::client::AuthClient;
use farmchain_api::config::AppConfig;
use farmchain_api::database::manager::DatabaseManager;
use farmchain_api::registry::RegistryClient;
use farmchain_api::routes::app;
use farmchain_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_SERVICE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    tracing::info!("Starting FarmChain API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database)
        .unwrap_or_else(|e| panic!("failed to initialize database pool: {}", e));

    // Mirrors the original deployment's dev-time table bootstrap. Managed
    // environments run real migrations; a failure here only degrades /health.
    if config.database.bootstrap_schema {
        if let Err(e) = DatabaseManager::ensure_schema(&pool).await {
            tracing::warn!("Schema bootstrap failed, /health will report degraded: {}", e);
        }
    }

    let auth = AuthClient::new(
        &config.auth.base_url,
        Duration::from_secs(config.auth.validate_timeout_secs),
    )
    .expect("failed to build authorization client");

    // Allow tests or deployments to override port via env
    let port = std::env::var("FARMCHAIN_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(5000);

    let registry = RegistryClient::new(config.registry.clone(), port)
        .expect("failed to build registry client");

    let state = AppState::new(config, pool, auth);
    let app = app(state);

    // Registration runs in the background; serving never waits on the registry.
    registry.spawn();

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 FarmChain API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
