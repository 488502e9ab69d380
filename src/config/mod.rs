use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub registry: RegistryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub bootstrap_schema: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the external authorization service; the validation
    /// endpoint lives at <base>/auth/public/validate.
    pub base_url: String,
    pub validate_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Discovery registry base URL. Registration is skipped when unset.
    pub url: Option<String>,
    pub app_name: String,
    pub instance_host: String,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub lease_renewal_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs = v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_BOOTSTRAP_SCHEMA") {
            self.database.bootstrap_schema = v.parse().unwrap_or(self.database.bootstrap_schema);
        }

        // Authorization service overrides
        if let Ok(v) = env::var("AUTH_SERVICE_URL") {
            if is_valid_base_url(&v) {
                self.auth.base_url = v;
            } else {
                tracing::warn!("Ignoring malformed AUTH_SERVICE_URL: {}", v);
            }
        }
        if let Ok(v) = env::var("AUTH_VALIDATE_TIMEOUT_SECS") {
            self.auth.validate_timeout_secs = v.parse().unwrap_or(self.auth.validate_timeout_secs);
        }

        // Registry overrides
        if let Ok(v) = env::var("REGISTRY_URL") {
            if is_valid_base_url(&v) {
                self.registry.url = Some(v);
            } else {
                tracing::warn!("Ignoring malformed REGISTRY_URL: {}", v);
            }
        }
        if let Ok(v) = env::var("REGISTRY_APP_NAME") {
            self.registry.app_name = v;
        }
        if let Ok(v) = env::var("REGISTRY_INSTANCE_HOST") {
            self.registry.instance_host = v;
        }
        if let Ok(v) = env::var("REGISTRY_MAX_ATTEMPTS") {
            self.registry.max_attempts = v.parse().unwrap_or(self.registry.max_attempts);
        }
        if let Ok(v) = env::var("REGISTRY_BASE_DELAY_MS") {
            self.registry.base_delay_ms = v.parse().unwrap_or(self.registry.base_delay_ms);
        }
        if let Ok(v) = env::var("REGISTRY_LEASE_RENEWAL_SECS") {
            self.registry.lease_renewal_secs = v.parse().unwrap_or(self.registry.lease_renewal_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: "postgres://postgres@localhost:5432/farmchain".to_string(),
                max_connections: 10,
                acquire_timeout_secs: 30,
                bootstrap_schema: true,
            },
            auth: AuthConfig {
                base_url: "http://localhost:9000".to_string(),
                validate_timeout_secs: 5,
            },
            registry: RegistryConfig {
                url: None,
                app_name: "farm-chain-service".to_string(),
                instance_host: "127.0.0.1".to_string(),
                max_attempts: 5,
                base_delay_ms: 500,
                lease_renewal_secs: 30,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: "postgres://postgres@localhost:5432/farmchain".to_string(),
                max_connections: 20,
                acquire_timeout_secs: 10,
                bootstrap_schema: false,
            },
            auth: AuthConfig {
                base_url: "http://localhost:9000".to_string(),
                validate_timeout_secs: 5,
            },
            registry: RegistryConfig {
                url: Some("http://localhost:8761/eureka".to_string()),
                app_name: "farm-chain-service".to_string(),
                instance_host: "127.0.0.1".to_string(),
                max_attempts: 5,
                base_delay_ms: 500,
                lease_renewal_secs: 30,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: "postgres://postgres@localhost:5432/farmchain".to_string(),
                max_connections: 50,
                acquire_timeout_secs: 5,
                bootstrap_schema: false,
            },
            auth: AuthConfig {
                base_url: "http://localhost:9000".to_string(),
                validate_timeout_secs: 3,
            },
            registry: RegistryConfig {
                url: Some("http://localhost:8761/eureka".to_string()),
                app_name: "farm-chain-service".to_string(),
                instance_host: "127.0.0.1".to_string(),
                max_attempts: 5,
                base_delay_ms: 500,
                lease_renewal_secs: 30,
            },
        }
    }
}

fn is_valid_base_url(candidate: &str) -> bool {
    url::Url::parse(candidate)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}
