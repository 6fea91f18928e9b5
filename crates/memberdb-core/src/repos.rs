// System-store persistence seams for tenant databases and metadata

use memberdb_commons::{
    AppResult, MembershipId, MetadataId, SchemaMetadata, TableDescriptor, TenantDatabase,
    TenantDbId,
};

/// Persistence for tenant database registrations.
#[async_trait::async_trait]
pub trait TenantDatabaseRepository: Send + Sync {
    /// Persist a registration. A uniqueness collision on
    /// (membership, host, port, username, password, database_name) maps to
    /// `AppError::DuplicateRegistration`.
    async fn insert(&self, db: &TenantDatabase) -> AppResult<()>;

    /// Fetch a registration only if `owner` owns it. Ownership is part of
    /// the query predicate, not filtered after the fact, so a foreign id
    /// is indistinguishable from a missing one.
    async fn find_owned(
        &self,
        id: TenantDbId,
        owner: MembershipId,
    ) -> AppResult<Option<TenantDatabase>>;
}

/// Persistence for schema metadata snapshots.
#[async_trait::async_trait]
pub trait MetadataRepository: Send + Sync {
    /// Replace-or-create the single snapshot for `db_id`: an existing row
    /// gets the new table list and a bumped `updated_at`; otherwise a row
    /// is inserted. Returns the stored snapshot.
    async fn upsert(
        &self,
        db_id: TenantDbId,
        tables: Vec<TableDescriptor>,
    ) -> AppResult<SchemaMetadata>;

    /// All snapshots owned by `owner`, paired with the owning database's
    /// display name.
    async fn list_for_owner(
        &self,
        owner: MembershipId,
    ) -> AppResult<Vec<(SchemaMetadata, String)>>;

    /// Owner-scoped snapshot fetch; `None` covers both missing and
    /// foreign-owned.
    async fn get_owned(
        &self,
        id: MetadataId,
        owner: MembershipId,
    ) -> AppResult<Option<SchemaMetadata>>;

    /// Owner-scoped fetch that also resolves the owning tenant database
    /// (needed to reconnect for sampling).
    async fn get_owned_with_db(
        &self,
        id: MetadataId,
        owner: MembershipId,
    ) -> AppResult<Option<(SchemaMetadata, TenantDatabase)>>;

    /// Owner-scoped delete. `false` when nothing matched.
    async fn delete_owned(&self, id: MetadataId, owner: MembershipId) -> AppResult<bool>;
}
