// Schema extraction into versioned metadata snapshots

use std::sync::Arc;

use log::info;

use memberdb_commons::{
    AppError, AppResult, ColumnDescriptor, ColumnId, Membership, SchemaMetadata, TableDescriptor,
    TenantDbId,
};

use crate::repos::{MetadataRepository, TenantDatabaseRepository};
use crate::tenant::{IntrospectedTable, TenantConnector};

/// Walks a tenant database's catalog and upserts the result as the single
/// live snapshot for that database.
pub struct SchemaIntrospector {
    connector: Arc<dyn TenantConnector>,
    tenant_dbs: Arc<dyn TenantDatabaseRepository>,
    metadata: Arc<dyn MetadataRepository>,
}

impl SchemaIntrospector {
    pub fn new(
        connector: Arc<dyn TenantConnector>,
        tenant_dbs: Arc<dyn TenantDatabaseRepository>,
        metadata: Arc<dyn MetadataRepository>,
    ) -> Self {
        Self {
            connector,
            tenant_dbs,
            metadata,
        }
    }

    /// Extract the schema of `db_id`, which must belong to `owner`.
    ///
    /// A database with zero tables yields an empty snapshot, not an error.
    /// Column ids are regenerated on every extract: re-running against an
    /// unchanged schema still produces brand-new `column_id`s, so callers
    /// must re-resolve ids after each refresh.
    pub async fn extract(&self, db_id: TenantDbId, owner: &Membership) -> AppResult<SchemaMetadata> {
        let db = self
            .tenant_dbs
            .find_owned(db_id, owner.id)
            .await?
            .ok_or(AppError::MembershipDbNotFound)?;

        let raw = self.connector.read_schema(&db).await?;
        let tables = assign_column_ids(raw);

        let snapshot = self.metadata.upsert(db.id, tables).await?;
        info!(
            "extracted schema of tenant database {}: {} tables",
            db.id,
            snapshot.table_informations.len()
        );
        Ok(snapshot)
    }
}

/// Turns raw catalog rows into snapshot descriptors, assigning each column
/// a fresh opaque id.
fn assign_column_ids(raw: Vec<IntrospectedTable>) -> Vec<TableDescriptor> {
    raw.into_iter()
        .map(|table| TableDescriptor {
            table_name: table.table_name,
            columns: table
                .columns
                .into_iter()
                .map(|column| ColumnDescriptor {
                    column_id: ColumnId::generate(),
                    name: column.name,
                    data_type: column.data_type,
                    nullable: column.nullable,
                    ordinal_position: column.ordinal_position,
                })
                .collect(),
        })
        .collect()
}
