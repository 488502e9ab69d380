use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::client::AuthClient;
use crate::config::AppConfig;

/// Shared per-process context, built once in `main` and handed to the router.
/// Replaces the module-global app/database handles of the original service.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: PgPool,
    pub auth: AuthClient,
}

impl AppState {
    pub fn new(config: AppConfig, db: PgPool, auth: AuthClient) -> Self {
        Self {
            config: Arc::new(config),
            db,
            auth,
        }
    }
}
