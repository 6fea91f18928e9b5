// Membership and role persistence

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use memberdb_auth::MembershipRepository;
use memberdb_commons::{AppError, AppResult, Membership, MembershipId, Role};

use crate::{insert_err, store_err};

pub struct PgMembershipRepository {
    pool: PgPool,
}

impl PgMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MembershipRepository for PgMembershipRepository {
    async fn find_by_username_with_role(
        &self,
        username: &str,
    ) -> AppResult<Option<(Membership, Option<Role>)>> {
        let row = sqlx::query(
            r#"
            SELECT m.id, m.username, m.password, m.role_id, m.created_at, m.updated_at,
                   r.name AS role_name, r.permissions AS role_permissions
            FROM memberships m
            LEFT JOIN roles r ON r.name = m.role_id
            WHERE m.username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.map(|row| {
            let membership = membership_from_row(&row)?;
            let role = role_from_row(&row)?;
            Ok((membership, role))
        })
        .transpose()
    }

    async fn insert(&self, membership: &Membership) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO memberships (id, username, password, role_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(membership.id.as_uuid())
        .bind(&membership.username)
        .bind(&membership.password)
        .bind(&membership.role_id)
        .bind(membership.created_at)
        .bind(membership.updated_at)
        .execute(&self.pool)
        .await
        .map_err(insert_err)?;
        Ok(())
    }
}

fn membership_from_row(row: &PgRow) -> AppResult<Membership> {
    Ok(Membership {
        id: MembershipId::from_uuid(row.try_get("id").map_err(store_err)?),
        username: row.try_get("username").map_err(store_err)?,
        password: row.try_get("password").map_err(store_err)?,
        role_id: row.try_get("role_id").map_err(store_err)?,
        created_at: row.try_get("created_at").map_err(store_err)?,
        updated_at: row.try_get("updated_at").map_err(store_err)?,
    })
}

fn role_from_row(row: &PgRow) -> AppResult<Option<Role>> {
    let name: Option<String> = row.try_get("role_name").map_err(store_err)?;
    let Some(name) = name else {
        return Ok(None);
    };
    let permissions: serde_json::Value = row.try_get("role_permissions").map_err(store_err)?;
    let permissions = serde_json::from_value(permissions)
        .map_err(|e| AppError::Store(format!("role permissions column is corrupt: {e}")))?;
    Ok(Some(Role { name, permissions }))
}

/// Idempotent seeding used by `--migrate` bootstrap.
pub mod bootstrap {
    use super::*;
    use memberdb_auth::password::hash_password;

    /// Create or update a role with the given permission set.
    pub async fn ensure_role(pool: &PgPool, name: &str, permissions: &[String]) -> AppResult<()> {
        let permissions = serde_json::to_value(permissions)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        sqlx::query(
            r#"
            INSERT INTO roles (name, permissions)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET permissions = EXCLUDED.permissions
            "#,
        )
        .bind(name)
        .bind(permissions)
        .execute(pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    /// Create the admin membership if the username is not taken yet.
    /// The password is hashed here; an existing membership is left alone.
    pub async fn ensure_membership(
        pool: &PgPool,
        username: &str,
        password: &str,
        role_id: &str,
    ) -> AppResult<()> {
        let exists = sqlx::query("SELECT 1 FROM memberships WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await
            .map_err(store_err)?
            .is_some();
        if exists {
            return Ok(());
        }

        let membership = Membership::new(
            username.to_string(),
            hash_password(password).await?,
            Some(role_id.to_string()),
        );
        PgMembershipRepository::new(pool.clone())
            .insert(&membership)
            .await
    }
}
