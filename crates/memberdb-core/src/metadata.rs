// Metadata snapshot CRUD, owner-scoped

use std::sync::Arc;

use memberdb_commons::{
    AppError, AppResult, Membership, MetadataId, SchemaMetadata, SnapshotSummary,
};

use crate::repos::MetadataRepository;

/// List / get / delete over persisted snapshots.
///
/// Everything here is scoped to the calling membership through the store's
/// ownership join. A snapshot owned by someone else answers exactly like a
/// snapshot that does not exist (404, never 403), so ids cannot be probed
/// across tenants.
pub struct MetadataService {
    metadata: Arc<dyn MetadataRepository>,
}

impl MetadataService {
    pub fn new(metadata: Arc<dyn MetadataRepository>) -> Self {
        Self { metadata }
    }

    pub async fn list(&self, owner: &Membership) -> AppResult<Vec<SnapshotSummary>> {
        let rows = self.metadata.list_for_owner(owner.id).await?;
        Ok(rows
            .iter()
            .map(|(snapshot, database_name)| {
                SnapshotSummary::from_snapshot(snapshot, database_name.clone())
            })
            .collect())
    }

    pub async fn get(&self, id: MetadataId, owner: &Membership) -> AppResult<SchemaMetadata> {
        self.metadata
            .get_owned(id, owner.id)
            .await?
            .ok_or(AppError::MetadataNotFound)
    }

    pub async fn delete(&self, id: MetadataId, owner: &Membership) -> AppResult<()> {
        if self.metadata.delete_owned(id, owner.id).await? {
            Ok(())
        } else {
            Err(AppError::MetadataNotFound)
        }
    }
}
