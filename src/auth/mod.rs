use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub mod client;

/// Claims returned by the authorization service for a validated token.
/// The permission set is the only part this service acts on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub permissions: HashSet<String>,
    #[serde(default)]
    pub subject: Option<String>,
}

impl Claims {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Permission names, one per protected operation.
pub mod permissions {
    pub const CREATE_RECORD: &str = "CREATE_RECORD";
    pub const VIEW_RECORD: &str = "VIEW_RECORD";
    pub const CREATE_CONTRACT: &str = "CREATE_CONTRACT";
    pub const UPDATE_CONTRACT: &str = "UPDATE_CONTRACT";
    pub const LOCK_PAYMENT: &str = "LOCK_PAYMENT";
    pub const RELEASE_PAYMENT: &str = "RELEASE_PAYMENT";
}
