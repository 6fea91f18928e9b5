//! Shared test fixtures: in-memory repository fakes, a scriptable tenant
//! connector, a canned oracle and a harness that assembles the real
//! handlers on top of them.

// Each integration test crate compiles its own copy; not every test uses
// every fixture.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::{test, web, App};
use base64::prelude::*;
use chrono::Utc;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use memberdb_api::{configure_routes, AppState};
use memberdb_auth::password::hash_password;
use memberdb_auth::{CredentialCipher, MembershipRepository};
use memberdb_commons::{
    AppError, AppResult, Membership, MembershipId, MetadataId, Role, SchemaMetadata,
    TableDescriptor, TenantDatabase, TenantDbId,
};
use memberdb_core::{
    ClassificationOracle, GroupedLabels, IntrospectedColumn, IntrospectedTable,
    MetadataRepository, TenantConnector, TenantDatabaseRepository,
};

// ---------------------------------------------------------------------------
// In-memory repositories

#[derive(Default)]
pub struct InMemoryMemberships {
    rows: Mutex<HashMap<String, (Membership, Option<Role>)>>,
}

impl InMemoryMemberships {
    pub fn add(&self, membership: Membership, role: Option<Role>) {
        self.rows
            .lock()
            .unwrap()
            .insert(membership.username.clone(), (membership, role));
    }
}

#[async_trait::async_trait]
impl MembershipRepository for InMemoryMemberships {
    async fn find_by_username_with_role(
        &self,
        username: &str,
    ) -> AppResult<Option<(Membership, Option<Role>)>> {
        Ok(self.rows.lock().unwrap().get(username).cloned())
    }

    async fn insert(&self, membership: &Membership) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&membership.username) {
            return Err(AppError::DuplicateRegistration);
        }
        rows.insert(membership.username.clone(), (membership.clone(), None));
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryTenantDbs {
    rows: Mutex<Vec<TenantDatabase>>,
}

impl InMemoryTenantDbs {
    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn find(&self, id: TenantDbId) -> Option<TenantDatabase> {
        self.rows.lock().unwrap().iter().find(|db| db.id == id).cloned()
    }
}

#[async_trait::async_trait]
impl TenantDatabaseRepository for InMemoryTenantDbs {
    async fn insert(&self, db: &TenantDatabase) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        // Mirrors the store's unique_membership_database constraint.
        let duplicate = rows.iter().any(|row| {
            row.membership_id == db.membership_id
                && row.host == db.host
                && row.port == db.port
                && row.username == db.username
                && row.password == db.password
                && row.database_name == db.database_name
        });
        if duplicate {
            return Err(AppError::DuplicateRegistration);
        }
        rows.push(db.clone());
        Ok(())
    }

    async fn find_owned(
        &self,
        id: TenantDbId,
        owner: MembershipId,
    ) -> AppResult<Option<TenantDatabase>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|db| db.id == id && db.membership_id == owner)
            .cloned())
    }
}

pub struct InMemoryMetadata {
    rows: Mutex<Vec<SchemaMetadata>>,
    tenant_dbs: Arc<InMemoryTenantDbs>,
}

impl InMemoryMetadata {
    pub fn new(tenant_dbs: Arc<InMemoryTenantDbs>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            tenant_dbs,
        }
    }

    fn owned_db(&self, snapshot: &SchemaMetadata, owner: MembershipId) -> Option<TenantDatabase> {
        self.tenant_dbs
            .find(snapshot.db_id)
            .filter(|db| db.membership_id == owner)
    }
}

#[async_trait::async_trait]
impl MetadataRepository for InMemoryMetadata {
    async fn upsert(
        &self,
        db_id: TenantDbId,
        tables: Vec<TableDescriptor>,
    ) -> AppResult<SchemaMetadata> {
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        if let Some(existing) = rows.iter_mut().find(|s| s.db_id == db_id) {
            existing.table_informations = tables;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let snapshot = SchemaMetadata {
            id: MetadataId::generate(),
            db_id,
            table_informations: tables,
            created_at: now,
            updated_at: now,
        };
        rows.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn list_for_owner(
        &self,
        owner: MembershipId,
    ) -> AppResult<Vec<(SchemaMetadata, String)>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| {
                self.owned_db(s, owner)
                    .map(|db| (s.clone(), db.database_name))
            })
            .collect())
    }

    async fn get_owned(
        &self,
        id: MetadataId,
        owner: MembershipId,
    ) -> AppResult<Option<SchemaMetadata>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .filter(|s| self.owned_db(s, owner).is_some())
            .cloned())
    }

    async fn get_owned_with_db(
        &self,
        id: MetadataId,
        owner: MembershipId,
    ) -> AppResult<Option<(SchemaMetadata, TenantDatabase)>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .and_then(|s| self.owned_db(s, owner).map(|db| (s.clone(), db))))
    }

    async fn delete_owned(&self, id: MetadataId, owner: MembershipId) -> AppResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let target = rows
            .iter()
            .position(|s| s.id == id && self.owned_db(s, owner).is_some());
        match target {
            Some(index) => {
                rows.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Scriptable tenant connector and canned oracle

#[derive(Default)]
pub struct StubConnector {
    pub probe_fails: AtomicBool,
    pub tables: Mutex<Vec<IntrospectedTable>>,
    pub samples: Mutex<Vec<String>>,
    pub sample_calls: Mutex<Vec<(String, String, u32)>>,
}

#[async_trait::async_trait]
impl TenantConnector for StubConnector {
    async fn probe(&self, _db: &TenantDatabase) -> AppResult<()> {
        if self.probe_fails.load(Ordering::SeqCst) {
            Err(AppError::TenantConnection("connection refused".into()))
        } else {
            Ok(())
        }
    }

    async fn read_schema(&self, _db: &TenantDatabase) -> AppResult<Vec<IntrospectedTable>> {
        Ok(self.tables.lock().unwrap().clone())
    }

    async fn sample_column(
        &self,
        _db: &TenantDatabase,
        table: &str,
        column: &str,
        limit: u32,
    ) -> AppResult<Vec<String>> {
        self.sample_calls
            .lock()
            .unwrap()
            .push((table.to_string(), column.to_string(), limit));
        Ok(self.samples.lock().unwrap().clone())
    }
}

pub struct StubOracle {
    pub groups: GroupedLabels,
    pub prompts: Mutex<Vec<String>>,
}

impl Default for StubOracle {
    fn default() -> Self {
        let mut groups = GroupedLabels::new();
        groups.insert(
            "emails".to_string(),
            vec!["a@x.com".to_string(), "b@y.org".to_string()],
        );
        Self {
            groups,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ClassificationOracle for StubOracle {
    async fn classify(&self, prompt: &str) -> AppResult<GroupedLabels> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.groups.clone())
    }
}

// ---------------------------------------------------------------------------
// Harness

pub struct TestEnv {
    pub memberships: Arc<InMemoryMemberships>,
    pub tenant_dbs: Arc<InMemoryTenantDbs>,
    pub metadata: Arc<InMemoryMetadata>,
    pub connector: Arc<StubConnector>,
    pub oracle: Arc<StubOracle>,
    public_key: RsaPublicKey,
    state: web::Data<AppState>,
}

// Key generation is expensive in debug builds; every TestEnv shares one.
fn test_private_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap())
}

impl TestEnv {
    pub fn new() -> Self {
        let private_key = test_private_key().clone();
        let public_key = RsaPublicKey::from(&private_key);

        let memberships = Arc::new(InMemoryMemberships::default());
        let tenant_dbs = Arc::new(InMemoryTenantDbs::default());
        let metadata = Arc::new(InMemoryMetadata::new(tenant_dbs.clone()));
        let connector = Arc::new(StubConnector::default());
        let oracle = Arc::new(StubOracle::default());

        let state = web::Data::new(AppState::new(
            memberships.clone() as Arc<dyn MembershipRepository>,
            tenant_dbs.clone() as Arc<dyn TenantDatabaseRepository>,
            metadata.clone() as Arc<dyn MetadataRepository>,
            connector.clone() as Arc<dyn TenantConnector>,
            oracle.clone() as Arc<dyn ClassificationOracle>,
            CredentialCipher::new(private_key),
        ));

        Self {
            memberships,
            tenant_dbs,
            metadata,
            connector,
            oracle,
            public_key,
            state,
        }
    }

    pub async fn app(
        &self,
    ) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
    {
        test::init_service(
            App::new()
                .app_data(self.state.clone())
                .configure(configure_routes),
        )
        .await
    }

    /// Seed a membership whose role carries exactly `permissions`
    /// (full `api.*` strings).
    pub async fn seed_membership(
        &self,
        username: &str,
        password: &str,
        permissions: &[&str],
    ) -> Membership {
        let role = Role {
            name: format!("{username}-role"),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        };
        let membership = Membership::new(
            username.to_string(),
            hash_password(password).await.unwrap(),
            Some(role.name.clone()),
        );
        self.memberships.add(membership.clone(), Some(role));
        membership
    }

    /// Encrypt a registration payload against the harness's public key.
    pub fn encrypt_credentials(&self, host: &str, port: u16, database_name: &str) -> String {
        let payload = serde_json::json!({
            "driver": "postgresql",
            "host": host,
            "port": port,
            "username": "reader",
            "password": "tenant-pw",
            "database_name": database_name,
        });
        let ciphertext = self
            .public_key
            .encrypt(
                &mut rand::thread_rng(),
                Oaep::new::<Sha256>(),
                payload.to_string().as_bytes(),
            )
            .unwrap();
        hex::encode(ciphertext)
    }
}

/// `Authorization: Basic ...` header tuple for `insert_header`.
pub fn basic_auth(username: &str, password: &str) -> (header::HeaderName, String) {
    let encoded = BASE64_STANDARD.encode(format!("{username}:{password}"));
    (header::AUTHORIZATION, format!("Basic {encoded}"))
}

/// A small two-table schema used by the extraction tests, already in the
/// name order the introspector guarantees.
pub fn sales_schema() -> Vec<IntrospectedTable> {
    vec![
        IntrospectedTable {
            table_name: "customers".to_string(),
            columns: vec![
                IntrospectedColumn {
                    name: "id".to_string(),
                    data_type: "integer".to_string(),
                    nullable: false,
                    ordinal_position: 1,
                },
                IntrospectedColumn {
                    name: "email".to_string(),
                    data_type: "text".to_string(),
                    nullable: true,
                    ordinal_position: 2,
                },
            ],
        },
        IntrospectedTable {
            table_name: "orders".to_string(),
            columns: vec![IntrospectedColumn {
                name: "total".to_string(),
                data_type: "numeric".to_string(),
                nullable: false,
                ordinal_position: 1,
            }],
        },
    ]
}
