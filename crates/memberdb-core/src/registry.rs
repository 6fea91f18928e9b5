// Tenant database registration

use std::sync::Arc;

use log::info;

use memberdb_auth::CredentialCipher;
use memberdb_commons::{AppResult, Membership, TenantDatabase, TenantDbId};

use crate::repos::TenantDatabaseRepository;
use crate::tenant::TenantConnector;

/// Validates and persists tenant database registrations.
///
/// The order is load-bearing: decrypt, probe, then persist. A registration
/// that fails its connectivity probe is never written, so the store cannot
/// accumulate dead registrations, and persistence of a row is never
/// observable before its probe succeeded.
pub struct TenantDatabaseRegistry {
    cipher: CredentialCipher,
    connector: Arc<dyn TenantConnector>,
    tenant_dbs: Arc<dyn TenantDatabaseRepository>,
}

impl TenantDatabaseRegistry {
    pub fn new(
        cipher: CredentialCipher,
        connector: Arc<dyn TenantConnector>,
        tenant_dbs: Arc<dyn TenantDatabaseRepository>,
    ) -> Self {
        Self {
            cipher,
            connector,
            tenant_dbs,
        }
    }

    /// Register the database described by an OAEP ciphertext for `owner`.
    ///
    /// Returns the new registration id. Duplicate registrations surface as
    /// `DuplicateRegistration` from the store's uniqueness constraint.
    pub async fn register(&self, cipher_hex: &str, owner: &Membership) -> AppResult<TenantDbId> {
        let fields = self.cipher.decrypt(cipher_hex).await?;
        let db = TenantDatabase::from_credentials(fields, owner.id)?;

        // Probe connection is separate from any later use and is torn down
        // by the connector before this returns.
        self.connector.probe(&db).await?;

        self.tenant_dbs.insert(&db).await?;
        info!(
            "registered tenant database {} ({}) for membership {}",
            db.id, db.database_name, owner.id
        );
        Ok(db.id)
    }
}
