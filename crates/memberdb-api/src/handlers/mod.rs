//! Request handlers for the MemberDB API.

mod classify;
mod health;
mod memberships;
mod metadata;
mod tenant_dbs;

pub use classify::classify_column;
pub use health::healthcheck;
pub use memberships::create_membership;
pub use metadata::{delete_metadata, extract_metadata, get_metadata, list_metadata};
pub use tenant_dbs::create_database;
