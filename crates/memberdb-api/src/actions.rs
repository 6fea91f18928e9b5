//! Endpoint action names.
//!
//! The gate checks `api.<action>`; each handler passes its own constant so
//! the permission is bound to the operation, never to request data. `ALL`
//! feeds the bootstrap seed for the admin role.

pub const CREATE_MEMBERSHIP: &str = "create_membership";
pub const CREATE_DATABASE: &str = "create_database";
pub const EXTRACT_METADATA: &str = "extract_metadata";
pub const LIST_METADATA: &str = "list_metadata";
pub const GET_METADATA: &str = "get_metadata";
pub const DELETE_METADATA: &str = "delete_metadata";
pub const CLASSIFY_COLUMN: &str = "classify_column";

pub const ALL: [&str; 7] = [
    CREATE_MEMBERSHIP,
    CREATE_DATABASE,
    EXTRACT_METADATA,
    LIST_METADATA,
    GET_METADATA,
    DELETE_METADATA,
    CLASSIFY_COLUMN,
];

/// The permission string a role must hold for an action.
pub fn permission_for(action: &str) -> String {
    format!("api.{action}")
}
