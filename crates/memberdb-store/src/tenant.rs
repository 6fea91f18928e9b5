// Live connections to tenant-registered databases

use std::str::FromStr;
use std::time::Duration;

use log::debug;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Row};

use memberdb_commons::{AppError, AppResult, TenantDatabase};
use memberdb_core::{IntrospectedColumn, IntrospectedTable, TenantConnector};

/// Connects to tenant databases one operation at a time.
///
/// Each call builds a single-connection pool from the registration's
/// normalized connection string and closes it before returning, success or
/// failure. Nothing is cached per tenant, so resource use stays flat no
/// matter how many databases are registered. The connect timeout bounds
/// what a tenant-controlled endpoint can do to a request.
pub struct PgTenantConnector {
    connect_timeout: Duration,
}

impl PgTenantConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    async fn open(&self, db: &TenantDatabase) -> AppResult<PgPool> {
        let options = PgConnectOptions::from_str(&db.connection_string())
            .map_err(|e| AppError::TenantConnection(format!("invalid connection target: {e}")))?;

        PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(self.connect_timeout)
            .connect_with(options)
            .await
            .map_err(tenant_err)
    }
}

#[async_trait::async_trait]
impl TenantConnector for PgTenantConnector {
    async fn probe(&self, db: &TenantDatabase) -> AppResult<()> {
        let pool = self.open(db).await?;
        let result = sqlx::query("SELECT 1").execute(&pool).await;
        pool.close().await;
        result.map_err(tenant_err)?;
        debug!("probe of tenant database {} succeeded", db.id);
        Ok(())
    }

    async fn read_schema(&self, db: &TenantDatabase) -> AppResult<Vec<IntrospectedTable>> {
        let pool = self.open(db).await?;
        let result = read_schema_inner(&pool).await;
        pool.close().await;
        result
    }

    async fn sample_column(
        &self,
        db: &TenantDatabase,
        table: &str,
        column: &str,
        limit: u32,
    ) -> AppResult<Vec<String>> {
        let pool = self.open(db).await?;
        let result = sample_column_inner(&pool, table, column, limit).await;
        pool.close().await;
        result
    }
}

async fn read_schema_inner(pool: &PgPool) -> AppResult<Vec<IntrospectedTable>> {
    // information_schema columns are domain types; cast so decoding does
    // not depend on domain resolution.
    let table_rows = sqlx::query(
        r#"
        SELECT table_name::text AS table_name
        FROM information_schema.tables
        WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
        ORDER BY table_name
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(tenant_err)?;

    let mut tables = Vec::with_capacity(table_rows.len());
    for table_row in table_rows {
        let table_name: String = table_row.try_get("table_name").map_err(tenant_err)?;

        let column_rows = sqlx::query(
            r#"
            SELECT column_name::text AS column_name,
                   data_type::text AS data_type,
                   is_nullable::text AS is_nullable,
                   ordinal_position::int4 AS ordinal_position
            FROM information_schema.columns
            WHERE table_schema = 'public' AND table_name = $1
            ORDER BY ordinal_position
            "#,
        )
        .bind(&table_name)
        .fetch_all(pool)
        .await
        .map_err(tenant_err)?;

        let columns = column_rows
            .iter()
            .map(|row| {
                let nullable: String = row.try_get("is_nullable").map_err(tenant_err)?;
                Ok(IntrospectedColumn {
                    name: row.try_get("column_name").map_err(tenant_err)?,
                    data_type: row.try_get("data_type").map_err(tenant_err)?,
                    nullable: nullable.eq_ignore_ascii_case("YES"),
                    ordinal_position: row.try_get("ordinal_position").map_err(tenant_err)?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        tables.push(IntrospectedTable {
            table_name,
            columns,
        });
    }
    Ok(tables)
}

async fn sample_column_inner(
    pool: &PgPool,
    table: &str,
    column: &str,
    limit: u32,
) -> AppResult<Vec<String>> {
    // Identifiers come from our own snapshot, but quote them anyway; a
    // tenant's table names are still tenant-chosen strings. Ordering by the
    // column makes the sample deterministic for a given table state.
    let query = format!(
        "SELECT {col}::text AS value FROM public.{table} \
         WHERE {col} IS NOT NULL ORDER BY {col} LIMIT $1",
        col = quote_ident(column),
        table = quote_ident(table),
    );

    let rows = sqlx::query(&query)
        .bind(limit as i64)
        .fetch_all(pool)
        .await
        .map_err(tenant_err)?;

    rows.iter()
        .map(|row| row.try_get::<String, _>("value").map_err(tenant_err))
        .collect()
}

/// Double-quote an identifier, escaping embedded quotes.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn tenant_err(e: sqlx::Error) -> AppError {
    AppError::TenantConnection(e.to_string())
}
