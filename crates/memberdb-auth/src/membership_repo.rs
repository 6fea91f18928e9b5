// Membership persistence seam

use memberdb_commons::{AppResult, Membership, Role};

/// Abstraction over membership persistence for authentication flows.
///
/// The production implementation lives in memberdb-store (sqlx/Postgres);
/// tests use in-memory fakes. Defined here so the gate does not depend on
/// a concrete store.
#[async_trait::async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Look up a membership and its resolved role in one round trip.
    /// `None` when the username is unknown; the role side is `None` when
    /// the membership has no role or the role row is gone.
    async fn find_by_username_with_role(
        &self,
        username: &str,
    ) -> AppResult<Option<(Membership, Option<Role>)>>;

    /// Persist a new membership. Username uniqueness is enforced by the
    /// store; a collision surfaces as `DuplicateRegistration`.
    async fn insert(&self, membership: &Membership) -> AppResult<()>;
}
