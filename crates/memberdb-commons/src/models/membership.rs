//! Membership: a tenant/user identity in this service.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ids::MembershipId;

/// A registered membership. The password field holds the Argon2 PHC hash,
/// never plaintext, and is skipped on serialization so no outbound
/// representation can carry it.
#[derive(Clone, Serialize)]
pub struct Membership {
    pub id: MembershipId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(username: String, password_hash: String, role_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: MembershipId::generate(),
            username,
            password: password_hash,
            role_id,
            created_at: now,
            updated_at: now,
        }
    }
}

// Manual Debug so the hash cannot end up in logs.
impl fmt::Debug for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Membership")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role_id", &self.role_id)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}
