// Application state shared across handlers

use std::sync::Arc;

use memberdb_auth::{AuthGate, CredentialCipher, MembershipRepository};
use memberdb_core::{
    ClassificationBridge, ClassificationOracle, MetadataRepository, MetadataService,
    SchemaIntrospector, TenantConnector, TenantDatabaseRegistry, TenantDatabaseRepository,
};

/// Everything a handler needs, built once at startup from the injected
/// seams (production: sqlx-backed repos and the live connector; tests:
/// in-memory fakes). No ambient globals.
pub struct AppState {
    pub memberships: Arc<dyn MembershipRepository>,
    pub gate: AuthGate,
    pub registry: TenantDatabaseRegistry,
    pub introspector: SchemaIntrospector,
    pub metadata: MetadataService,
    pub classifier: ClassificationBridge,
}

impl AppState {
    pub fn new(
        memberships: Arc<dyn MembershipRepository>,
        tenant_dbs: Arc<dyn TenantDatabaseRepository>,
        metadata_repo: Arc<dyn MetadataRepository>,
        connector: Arc<dyn TenantConnector>,
        oracle: Arc<dyn ClassificationOracle>,
        cipher: CredentialCipher,
    ) -> Self {
        Self {
            memberships: memberships.clone(),
            gate: AuthGate::new(memberships),
            registry: TenantDatabaseRegistry::new(
                cipher,
                connector.clone(),
                tenant_dbs.clone(),
            ),
            introspector: SchemaIntrospector::new(
                connector.clone(),
                tenant_dbs,
                metadata_repo.clone(),
            ),
            metadata: MetadataService::new(metadata_repo.clone()),
            classifier: ClassificationBridge::new(metadata_repo, connector, oracle),
        }
    }
}
