// registry/mod.rs - discovery-registry client (Eureka wire format)

use std::time::Duration;

use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::RegistryConfig;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("registry rejected the request ({0})")]
    Rejected(reqwest::StatusCode),
}

/// Registers this instance with a Eureka-style discovery registry and keeps
/// the lease alive. Everything runs in a background task; startup and request
/// handling never wait on the registry.
pub struct RegistryClient {
    http: reqwest::Client,
    config: RegistryConfig,
    instance_id: String,
    port: u16,
}

impl RegistryClient {
    pub fn new(config: RegistryConfig, port: u16) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        let instance_id = format!("{}:{}:{}", config.instance_host, config.app_name, port);

        Ok(Self {
            http,
            config,
            instance_id,
            port,
        })
    }

    pub fn spawn(self) {
        let Some(base_url) = self.config.url.clone() else {
            info!("No registry configured, skipping service registration");
            return;
        };

        tokio::spawn(async move { self.run(base_url).await });
    }

    async fn run(self, base_url: String) {
        loop {
            if !self.register_with_backoff(&base_url).await {
                return;
            }
            self.renew_until_failure(&base_url).await;
            warn!("Registry lease lost, re-registering");
        }
    }

    /// Bounded exponential backoff: base delay doubling per attempt up to the
    /// configured cap, then give up with a warning.
    async fn register_with_backoff(&self, base_url: &str) -> bool {
        let mut delay = Duration::from_millis(self.config.base_delay_ms);

        for attempt in 1..=self.config.max_attempts {
            match self.register(base_url).await {
                Ok(()) => {
                    info!(app = %self.config.app_name, instance = %self.instance_id, "Registered with service registry");
                    return true;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Service registration failed");
                }
            }

            if attempt < self.config.max_attempts {
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }

        warn!(
            "Giving up on service registration after {} attempts",
            self.config.max_attempts
        );
        false
    }

    async fn register(&self, base_url: &str) -> Result<(), RegistryError> {
        let url = format!("{}/apps/{}", base_url.trim_end_matches('/'), self.config.app_name);
        let response = self
            .http
            .post(&url)
            .json(&self.instance_document())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RegistryError::Rejected(response.status()));
        }
        Ok(())
    }

    /// Renew the lease until a renewal fails; the caller re-registers then.
    async fn renew_until_failure(&self, base_url: &str) {
        let url = format!(
            "{}/apps/{}/{}",
            base_url.trim_end_matches('/'),
            self.config.app_name,
            self.instance_id
        );

        loop {
            tokio::time::sleep(Duration::from_secs(self.config.lease_renewal_secs)).await;

            match self.http.put(&url).send().await {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => {
                    warn!(status = %response.status(), "Lease renewal rejected");
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "Lease renewal failed");
                    return;
                }
            }
        }
    }

    /// Standard Eureka instance document.
    fn instance_document(&self) -> serde_json::Value {
        json!({
            "instance": {
                "instanceId": self.instance_id,
                "hostName": self.config.instance_host,
                "app": self.config.app_name.to_uppercase(),
                "ipAddr": self.config.instance_host,
                "status": "UP",
                "port": { "$": self.port, "@enabled": "true" },
                "dataCenterInfo": {
                    "@class": "com.netflix.appinfo.InstanceInfo$DefaultDataCenterInfo",
                    "name": "MyOwn"
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;

    fn test_config() -> RegistryConfig {
        RegistryConfig {
            url: Some("http://localhost:8761/eureka".to_string()),
            app_name: "farm-chain-service".to_string(),
            instance_host: "10.0.0.7".to_string(),
            max_attempts: 3,
            base_delay_ms: 100,
            lease_renewal_secs: 30,
        }
    }

    #[test]
    fn instance_document_follows_the_eureka_shape() {
        let client = RegistryClient::new(test_config(), 5000).unwrap();
        let doc = client.instance_document();

        assert_eq!(doc["instance"]["app"], "FARM-CHAIN-SERVICE");
        assert_eq!(doc["instance"]["instanceId"], "10.0.0.7:farm-chain-service:5000");
        assert_eq!(doc["instance"]["port"]["$"], 5000);
        assert_eq!(doc["instance"]["status"], "UP");
    }
}
