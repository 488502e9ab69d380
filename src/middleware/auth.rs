use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Extension,
};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;

/// The permission a protected route requires. Declared per route as an
/// extension and enforced uniformly by `permission_guard`, so no handler
/// carries its own authorization wrapping.
#[derive(Clone, Copy, Debug)]
pub struct RequiredPermission(pub &'static str);

/// Layer that attaches a route's permission declaration.
pub fn require_permission(permission: &'static str) -> Extension<RequiredPermission> {
    Extension(RequiredPermission(permission))
}

/// Token-validation middleware for protected routes.
///
/// A missing or malformed Authorization header fails immediately; no outbound
/// call is made in that case. Otherwise the token is forwarded to the
/// authorization service and the returned claims become the request's
/// authorization context.
pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(ApiError::unauthorized)?;

    let claims = state.auth.validate(&token).await?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Router-level guard comparing the route's declared permission against the
/// claims injected by `authenticate`. Runs after authentication, so a denial
/// here is always a 403, never a 401.
pub async fn permission_guard(request: Request, next: Next) -> Result<Response, ApiError> {
    let required = request
        .extensions()
        .get::<RequiredPermission>()
        .copied()
        .ok_or_else(|| ApiError::internal_server_error("Route is missing a permission declaration"))?;

    let claims = request
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| ApiError::unauthorized("Missing authentication context"))?;

    if !claims.has_permission(required.0) {
        return Err(ApiError::forbidden(format!(
            "Missing required permission: {}",
            required.0
        )));
    }

    Ok(next.run(request).await)
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
