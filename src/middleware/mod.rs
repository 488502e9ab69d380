pub mod auth;

pub use auth::{authenticate, permission_guard, require_permission, RequiredPermission};
