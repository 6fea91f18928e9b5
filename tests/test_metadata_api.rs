//! Schema extraction and snapshot CRUD, including cross-tenant isolation.

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::json;

use common::{basic_auth, sales_schema, TestEnv};

const OWNER_PERMS: &[&str] = &[
    "api.create_database",
    "api.extract_metadata",
    "api.list_metadata",
    "api.get_metadata",
    "api.delete_metadata",
];

/// Register a tenant database for the given caller, returning its id.
async fn register_db(env: &TestEnv, username: &str, password: &str, dbname: &str) -> String {
    let app = env.app().await;
    let cipher = env.encrypt_credentials("db.internal", 5432, dbname);
    let req = test::TestRequest::post()
        .uri("/api/v1/membership-dbs")
        .insert_header(basic_auth(username, password))
        .set_json(json!({ "cipher": cipher }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    body["database_id"].as_str().unwrap().to_string()
}

async fn extract(env: &TestEnv, username: &str, password: &str, db_id: &str) -> serde_json::Value {
    let app = env.app().await;
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/membership-dbs/{db_id}/extract"))
        .insert_header(basic_auth(username, password))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    test::read_body_json(resp).await
}

#[actix_web::test]
async fn extract_returns_tables_in_name_order() {
    let env = TestEnv::new();
    env.seed_membership("alice", "pw1", OWNER_PERMS).await;
    *env.connector.tables.lock().unwrap() = sales_schema();

    let db_id = register_db(&env, "alice", "pw1", "sales").await;
    let body = extract(&env, "alice", "pw1", &db_id).await;

    assert_eq!(body["table_names"], json!(["customers", "orders"]));
    let tables = body["metadata"]["table_informations"].as_array().unwrap();
    assert_eq!(tables.len(), 2);
    let email = &tables[0]["columns"][1];
    assert_eq!(email["name"], "email");
    assert_eq!(email["data_type"], "text");
    assert_eq!(email["nullable"], true);
    assert_eq!(email["ordinal_position"], 2);
    assert!(email["column_id"].as_str().unwrap().len() == 32);
}

#[actix_web::test]
async fn re_extract_keeps_the_row_but_regenerates_column_ids() {
    let env = TestEnv::new();
    env.seed_membership("alice", "pw1", OWNER_PERMS).await;
    *env.connector.tables.lock().unwrap() = sales_schema();

    let db_id = register_db(&env, "alice", "pw1", "sales").await;
    let first = extract(&env, "alice", "pw1", &db_id).await;
    let second = extract(&env, "alice", "pw1", &db_id).await;

    // One live snapshot per database: same metadata_id on refresh.
    assert_eq!(first["metadata_id"], second["metadata_id"]);
    // But ids are ephemeral: a refresh invalidates previously seen ones.
    assert_ne!(
        first["metadata"]["table_informations"][0]["columns"][0]["column_id"],
        second["metadata"]["table_informations"][0]["columns"][0]["column_id"],
    );
}

#[actix_web::test]
async fn extract_of_zero_table_database_is_an_empty_snapshot() {
    let env = TestEnv::new();
    env.seed_membership("alice", "pw1", OWNER_PERMS).await;
    // connector default: no tables

    let db_id = register_db(&env, "alice", "pw1", "empty").await;
    let body = extract(&env, "alice", "pw1", &db_id).await;

    assert_eq!(body["table_names"], json!([]));
    assert_eq!(body["metadata"]["table_informations"], json!([]));
}

#[actix_web::test]
async fn extract_of_foreign_database_is_404() {
    let env = TestEnv::new();
    env.seed_membership("alice", "pw1", OWNER_PERMS).await;
    env.seed_membership("bob", "pw2", OWNER_PERMS).await;

    let db_id = register_db(&env, "alice", "pw1", "sales").await;

    let app = env.app().await;
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/membership-dbs/{db_id}/extract"))
        .insert_header(basic_auth("bob", "pw2"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error_code"], "exceptions.membershipDbNotFound");
}

#[actix_web::test]
async fn list_summarizes_own_snapshots_with_table_counts() {
    let env = TestEnv::new();
    env.seed_membership("alice", "pw1", OWNER_PERMS).await;
    *env.connector.tables.lock().unwrap() = sales_schema();

    let db_id = register_db(&env, "alice", "pw1", "sales").await;
    extract(&env, "alice", "pw1", &db_id).await;

    let app = env.app().await;
    let req = test::TestRequest::get()
        .uri("/api/v1/membership-dbs/metadata")
        .insert_header(basic_auth("alice", "pw1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let summaries = body.as_array().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0]["database_name"], "sales");
    assert_eq!(summaries[0]["table_count"], 2);
}

#[actix_web::test]
async fn cross_tenant_get_and_delete_are_404_not_403() {
    let env = TestEnv::new();
    env.seed_membership("alice", "pw1", OWNER_PERMS).await;
    env.seed_membership("bob", "pw2", OWNER_PERMS).await;
    *env.connector.tables.lock().unwrap() = sales_schema();

    let db_id = register_db(&env, "alice", "pw1", "sales").await;
    let extracted = extract(&env, "alice", "pw1", &db_id).await;
    let metadata_id = extracted["metadata_id"].as_str().unwrap().to_string();

    let app = env.app().await;
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/membership-dbs/metadata/{metadata_id}"))
        .insert_header(basic_auth("bob", "pw2"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error_code"], "exceptions.metadataNotFound");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/membership-dbs/metadata/{metadata_id}"))
        .insert_header(basic_auth("bob", "pw2"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Alice still sees it, and can delete it for real.
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/membership-dbs/metadata/{metadata_id}"))
        .insert_header(basic_auth("alice", "pw1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["table_names"], json!(["customers", "orders"]));

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/membership-dbs/metadata/{metadata_id}"))
        .insert_header(basic_auth("alice", "pw1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/membership-dbs/metadata/{metadata_id}"))
        .insert_header(basic_auth("alice", "pw1"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
