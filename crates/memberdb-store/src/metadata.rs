// Schema metadata snapshot persistence

use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use memberdb_commons::{
    AppError, AppResult, MembershipId, MetadataId, SchemaMetadata, TableDescriptor,
    TenantDatabase, TenantDbId,
};
use memberdb_core::MetadataRepository;

use crate::store_err;

pub struct PgMetadataRepository {
    pool: PgPool,
}

impl PgMetadataRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MetadataRepository for PgMetadataRepository {
    async fn upsert(
        &self,
        db_id: TenantDbId,
        tables: Vec<TableDescriptor>,
    ) -> AppResult<SchemaMetadata> {
        let items = serde_json::to_value(&tables)
            .map_err(|e| AppError::Internal(format!("snapshot serialization: {e}")))?;
        let now = Utc::now();

        // One live snapshot per tenant database: a second extract replaces
        // the table list and bumps updated_at on the existing row.
        let row = sqlx::query(
            r#"
            INSERT INTO database_metadata (id, db_id, metadata_items, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (db_id) DO UPDATE
                SET metadata_items = EXCLUDED.metadata_items,
                    updated_at = EXCLUDED.updated_at
            RETURNING id, db_id, metadata_items, created_at, updated_at
            "#,
        )
        .bind(MetadataId::generate().as_uuid())
        .bind(db_id.as_uuid())
        .bind(items)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;

        snapshot_from_row(&row)
    }

    async fn list_for_owner(
        &self,
        owner: MembershipId,
    ) -> AppResult<Vec<(SchemaMetadata, String)>> {
        let rows = sqlx::query(
            r#"
            SELECT dm.id, dm.db_id, dm.metadata_items, dm.created_at, dm.updated_at,
                   mdb.database_name
            FROM database_metadata dm
            JOIN membership_databases mdb ON mdb.id = dm.db_id
            WHERE mdb.membership_id = $1
            ORDER BY dm.created_at
            "#,
        )
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get("database_name").map_err(store_err)?;
                Ok((snapshot_from_row(row)?, name))
            })
            .collect()
    }

    async fn get_owned(
        &self,
        id: MetadataId,
        owner: MembershipId,
    ) -> AppResult<Option<SchemaMetadata>> {
        sqlx::query(
            r#"
            SELECT dm.id, dm.db_id, dm.metadata_items, dm.created_at, dm.updated_at
            FROM database_metadata dm
            JOIN membership_databases mdb ON mdb.id = dm.db_id
            WHERE dm.id = $1 AND mdb.membership_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?
        .map(|row| snapshot_from_row(&row))
        .transpose()
    }

    async fn get_owned_with_db(
        &self,
        id: MetadataId,
        owner: MembershipId,
    ) -> AppResult<Option<(SchemaMetadata, TenantDatabase)>> {
        sqlx::query(
            r#"
            SELECT dm.id, dm.db_id, dm.metadata_items, dm.created_at, dm.updated_at,
                   mdb.id AS tdb_id, mdb.membership_id, mdb.driver, mdb.host, mdb.port,
                   mdb.username, mdb.password, mdb.database_name,
                   mdb.created_at AS tdb_created_at, mdb.updated_at AS tdb_updated_at
            FROM database_metadata dm
            JOIN membership_databases mdb ON mdb.id = dm.db_id
            WHERE dm.id = $1 AND mdb.membership_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?
        .map(|row| {
            let snapshot = snapshot_from_row(&row)?;
            let db = tenant_db_from_aliased_row(&row)?;
            Ok((snapshot, db))
        })
        .transpose()
    }

    async fn delete_owned(&self, id: MetadataId, owner: MembershipId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM database_metadata dm
            USING membership_databases mdb
            WHERE dm.id = $1 AND dm.db_id = mdb.id AND mdb.membership_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(result.rows_affected() > 0)
    }
}

fn snapshot_from_row(row: &PgRow) -> AppResult<SchemaMetadata> {
    let items: serde_json::Value = row.try_get("metadata_items").map_err(store_err)?;
    let table_informations = serde_json::from_value(items)
        .map_err(|e| AppError::Store(format!("metadata_items column is corrupt: {e}")))?;
    Ok(SchemaMetadata {
        id: MetadataId::from_uuid(row.try_get("id").map_err(store_err)?),
        db_id: TenantDbId::from_uuid(row.try_get("db_id").map_err(store_err)?),
        table_informations,
        created_at: row.try_get("created_at").map_err(store_err)?,
        updated_at: row.try_get("updated_at").map_err(store_err)?,
    })
}

// The joined query aliases the tenant database's id and timestamps to
// avoid colliding with the snapshot's columns of the same name.
fn tenant_db_from_aliased_row(row: &PgRow) -> AppResult<TenantDatabase> {
    let port: i32 = row.try_get("port").map_err(store_err)?;
    Ok(TenantDatabase {
        id: TenantDbId::from_uuid(row.try_get("tdb_id").map_err(store_err)?),
        membership_id: MembershipId::from_uuid(
            row.try_get("membership_id").map_err(store_err)?,
        ),
        driver: row.try_get("driver").map_err(store_err)?,
        host: row.try_get("host").map_err(store_err)?,
        port: port as u16,
        username: row.try_get("username").map_err(store_err)?,
        password: row.try_get("password").map_err(store_err)?,
        database_name: row.try_get("database_name").map_err(store_err)?,
        created_at: row.try_get("tdb_created_at").map_err(store_err)?,
        updated_at: row.try_get("tdb_updated_at").map_err(store_err)?,
    })
}
