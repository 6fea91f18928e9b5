// Tenant database connectivity seam

use memberdb_commons::{AppResult, TenantDatabase};

/// Raw column row from a tenant catalog walk, before snapshot ids are
/// assigned.
#[derive(Debug, Clone)]
pub struct IntrospectedColumn {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub ordinal_position: i32,
}

/// Raw table from a tenant catalog walk, columns in ordinal order.
#[derive(Debug, Clone)]
pub struct IntrospectedTable {
    pub table_name: String,
    pub columns: Vec<IntrospectedColumn>,
}

/// Capability for talking to a tenant's external database.
///
/// Every operation opens its own short-lived connection and tears it down
/// before returning, in every path. Tenant connections are never cached
/// across calls, so resource use stays bounded however many tenants
/// register. All connection attempts carry a bounded timeout: the endpoint
/// is tenant-controlled and must not be able to hang a request forever.
/// Failures surface as `AppError::TenantConnection`.
#[async_trait::async_trait]
pub trait TenantConnector: Send + Sync {
    /// Liveness probe: connect and run a trivial query. The probe
    /// connection is discarded afterwards, never promoted to a live pool.
    async fn probe(&self, db: &TenantDatabase) -> AppResult<()>;

    /// Walk the default (public) namespace: tables ordered by name, each
    /// with its columns ordered by ordinal position.
    async fn read_schema(&self, db: &TenantDatabase) -> AppResult<Vec<IntrospectedTable>>;

    /// Read up to `limit` non-null values from one column, rendered as
    /// text, ordered by the column value itself (first N ascending).
    async fn sample_column(
        &self,
        db: &TenantDatabase,
        table: &str,
        column: &str,
        limit: u32,
    ) -> AppResult<Vec<String>>;
}
