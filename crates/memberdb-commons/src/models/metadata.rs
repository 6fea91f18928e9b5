//! Schema metadata snapshots: the persisted structured description of a
//! tenant database's tables and columns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ColumnId, MetadataId, TenantDbId};

/// One column of an introspected table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Opaque identifier, freshly generated on every extract. Not stable
    /// across refreshes even when the schema has not changed.
    pub column_id: ColumnId,
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub ordinal_position: i32,
}

/// One introspected table with its columns in ordinal order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub table_name: String,
    pub columns: Vec<ColumnDescriptor>,
}

/// The live snapshot for a tenant database. Exactly one exists per
/// `db_id`; a refresh replaces `table_informations` and bumps
/// `updated_at` instead of inserting a second row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaMetadata {
    pub id: MetadataId,
    pub db_id: TenantDbId,
    pub table_informations: Vec<TableDescriptor>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SchemaMetadata {
    /// Flat list of table names, in the snapshot's (name-sorted) order.
    pub fn table_names(&self) -> Vec<String> {
        self.table_informations
            .iter()
            .map(|t| t.table_name.clone())
            .collect()
    }

    /// Locates the table and column carrying `column_id`.
    pub fn find_column(
        &self,
        column_id: ColumnId,
    ) -> Option<(&TableDescriptor, &ColumnDescriptor)> {
        self.table_informations.iter().find_map(|table| {
            table
                .columns
                .iter()
                .find(|c| c.column_id == column_id)
                .map(|c| (table, c))
        })
    }
}

/// Listing row for `GET /membership-dbs/metadata`. `table_count` counts
/// tables, not columns, whatever the field history may suggest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub metadata_id: MetadataId,
    pub database_name: String,
    pub created_at: DateTime<Utc>,
    pub table_count: usize,
}

impl SnapshotSummary {
    pub fn from_snapshot(snapshot: &SchemaMetadata, database_name: String) -> Self {
        Self {
            metadata_id: snapshot.id,
            database_name,
            created_at: snapshot.created_at,
            table_count: snapshot.table_informations.len(),
        }
    }
}
