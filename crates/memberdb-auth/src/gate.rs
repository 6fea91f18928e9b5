// Authentication and authorization gate

use std::sync::Arc;

use log::debug;

use memberdb_commons::{AppError, AppResult, Membership};

use crate::basic_auth::BasicCredentials;
use crate::membership_repo::MembershipRepository;
use crate::password::verify_password;

/// Gate every protected operation passes through.
///
/// Check order is fixed: existence, then permission, then password.
/// Permission denial (403) is therefore distinguishable from a credential
/// mismatch, but unknown-username and wrong-password are both the same 401
/// body, so a caller cannot use the endpoint to enumerate usernames.
pub struct AuthGate {
    memberships: Arc<dyn MembershipRepository>,
}

impl AuthGate {
    pub fn new(memberships: Arc<dyn MembershipRepository>) -> Self {
        Self { memberships }
    }

    /// Resolve and authorize the caller for `action`.
    ///
    /// `action` is the endpoint's own constant (e.g. `create_database`);
    /// the permission looked up is `api.<action>`. Never pass anything
    /// request-derived here.
    pub async fn authenticate_and_authorize(
        &self,
        credentials: &BasicCredentials,
        action: &str,
    ) -> AppResult<Membership> {
        let (membership, role) = self
            .memberships
            .find_by_username_with_role(&credentials.username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let required = format!("api.{action}");
        let permitted = role.map(|r| r.has_permission(&required)).unwrap_or(false);
        if !permitted {
            debug!("membership {} denied action {action}", membership.id);
            return Err(AppError::NotAuthorized);
        }

        if !verify_password(&membership.password, &credentials.password).await? {
            return Err(AppError::Unauthorized);
        }

        Ok(membership)
    }
}
