// Tenant database registration persistence

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use memberdb_commons::{AppResult, MembershipId, TenantDatabase, TenantDbId};
use memberdb_core::TenantDatabaseRepository;

use crate::{insert_err, store_err};

pub struct PgTenantDatabaseRepository {
    pool: PgPool,
}

impl PgTenantDatabaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TenantDatabaseRepository for PgTenantDatabaseRepository {
    async fn insert(&self, db: &TenantDatabase) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO membership_databases
                (id, membership_id, driver, host, port, username, password,
                 database_name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(db.id.as_uuid())
        .bind(db.membership_id.as_uuid())
        .bind(&db.driver)
        .bind(&db.host)
        .bind(db.port as i32)
        .bind(&db.username)
        .bind(&db.password)
        .bind(&db.database_name)
        .bind(db.created_at)
        .bind(db.updated_at)
        .execute(&self.pool)
        .await
        .map_err(insert_err)?;
        Ok(())
    }

    async fn find_owned(
        &self,
        id: TenantDbId,
        owner: MembershipId,
    ) -> AppResult<Option<TenantDatabase>> {
        // Ownership is part of the predicate: a foreign row and a missing
        // row are the same `None` to the caller.
        sqlx::query(
            r#"
            SELECT id, membership_id, driver, host, port, username, password,
                   database_name, created_at, updated_at
            FROM membership_databases
            WHERE id = $1 AND membership_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?
        .map(|row| tenant_db_from_row(&row))
        .transpose()
    }
}

pub(crate) fn tenant_db_from_row(row: &PgRow) -> AppResult<TenantDatabase> {
    let port: i32 = row.try_get("port").map_err(store_err)?;
    Ok(TenantDatabase {
        id: TenantDbId::from_uuid(row.try_get("id").map_err(store_err)?),
        membership_id: MembershipId::from_uuid(row.try_get("membership_id").map_err(store_err)?),
        driver: row.try_get("driver").map_err(store_err)?,
        host: row.try_get("host").map_err(store_err)?,
        port: port as u16,
        username: row.try_get("username").map_err(store_err)?,
        password: row.try_get("password").map_err(store_err)?,
        database_name: row.try_get("database_name").map_err(store_err)?,
        created_at: row.try_get("created_at").map_err(store_err)?,
        updated_at: row.try_get("updated_at").map_err(store_err)?,
    })
}
