//! Role: a named permission bundle assigned to memberships.

use serde::{Deserialize, Serialize};

/// Named set of permission strings. `name` is the primary key that
/// `Membership::role_id` points at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub permissions: Vec<String>,
}

impl Role {
    /// Exact set-membership test. No prefix or wildcard matching.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}
