// MemberDB shared types
// Models, typed identifiers and the error taxonomy used across all crates.

pub mod errors;
pub mod ids;
pub mod models;

pub use errors::{AppError, AppResult};
pub use ids::{ColumnId, MembershipId, MetadataId, TenantDbId};
pub use models::{
    ColumnDescriptor, CredentialFields, Membership, Role, SchemaMetadata, SnapshotSummary,
    TableDescriptor, TenantDatabase,
};
