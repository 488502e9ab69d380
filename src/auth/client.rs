// auth/client.rs - outbound token validation against the authorization service

use std::time::Duration;

use thiserror::Error;

use super::Claims;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token rejected by authorization service ({0})")]
    Rejected(reqwest::StatusCode),

    #[error("authorization service unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("malformed claims response: {0}")]
    MalformedResponse(String),
}

/// Client for the external authorization service. One validation call is made
/// per protected request; there is no caching and no retry.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    validate_url: String,
}

impl AuthClient {
    /// The timeout bounds the whole round trip so a stalled authorization
    /// service cannot suspend request handling indefinitely.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let validate_url = format!("{}/auth/public/validate", base_url.trim_end_matches('/'));
        Ok(Self { http, validate_url })
    }

    /// Forward the bearer token and parse the returned claims. Every failure
    /// mode (non-2xx, network fault, unparseable body) surfaces as an
    /// `AuthError`; callers downgrade all of them to 401.
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let response = self
            .http
            .post(&self.validate_url)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AuthError::Rejected(response.status()));
        }

        response
            .json::<Claims>()
            .await
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn validate_parses_claims_on_success() {
        let base_url = testing::spawn_auth_stub(
            StatusCode::OK,
            json!({ "permissions": ["VIEW_RECORD"] }),
            testing::ValidationCounter::default(),
        )
        .await;

        let client = AuthClient::new(&base_url, Duration::from_secs(2)).unwrap();
        let claims = client.validate("any-token").await.unwrap();
        assert!(claims.has_permission("VIEW_RECORD"));
    }

    #[tokio::test]
    async fn validate_rejects_on_non_success_status() {
        let base_url = testing::spawn_auth_stub(
            StatusCode::UNAUTHORIZED,
            json!({ "error": "invalid token" }),
            testing::ValidationCounter::default(),
        )
        .await;

        let client = AuthClient::new(&base_url, Duration::from_secs(2)).unwrap();
        let err = client.validate("expired").await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(status) if status == StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn validate_flags_an_unparseable_body() {
        let base_url = testing::spawn_auth_stub(
            StatusCode::OK,
            json!({ "permissions": "not-a-list" }),
            testing::ValidationCounter::default(),
        )
        .await;

        let client = AuthClient::new(&base_url, Duration::from_secs(2)).unwrap();
        let err = client.validate("any-token").await.unwrap_err();
        assert!(matches!(err, AuthError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn validate_surfaces_connection_failures() {
        // Nothing is listening on this port.
        let client = AuthClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let err = client.validate("any-token").await.unwrap_err();
        assert!(matches!(err, AuthError::Unreachable(_)));
    }
}
