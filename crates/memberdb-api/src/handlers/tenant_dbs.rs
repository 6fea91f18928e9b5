//! Tenant database registration
//!
//! POST /api/v1/membership-dbs. The body carries the hex OAEP ciphertext of
//! the connection credentials. The registration is only persisted after a
//! successful live probe.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::actions;
use crate::auth::authorize;
use crate::errors::HttpError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EncryptedDatabaseRequest {
    pub cipher: String,
}

pub async fn create_database(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<EncryptedDatabaseRequest>,
) -> Result<HttpResponse, HttpError> {
    let caller = authorize(&req, &state, actions::CREATE_DATABASE).await?;

    let database_id = state.registry.register(&body.cipher, &caller).await?;
    Ok(HttpResponse::Created().json(json!({ "database_id": database_id })))
}
