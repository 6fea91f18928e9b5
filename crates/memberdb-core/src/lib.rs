// MemberDB core services
// Tenant database registration, schema introspection, metadata snapshots
// and LLM-backed column classification. Persistence and tenant connectivity
// are reached through the trait seams in `repos` and `tenant`; production
// implementations live in memberdb-store.

pub mod classify;
pub mod introspect;
pub mod metadata;
pub mod oracle;
pub mod registry;
pub mod repos;
pub mod tenant;

pub use classify::{ClassificationBridge, ClassificationOracle, GroupedLabels};
pub use introspect::SchemaIntrospector;
pub use metadata::MetadataService;
pub use registry::TenantDatabaseRegistry;
pub use repos::{MetadataRepository, TenantDatabaseRepository};
pub use tenant::{IntrospectedColumn, IntrospectedTable, TenantConnector};
