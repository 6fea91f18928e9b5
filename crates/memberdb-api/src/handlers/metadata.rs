//! Schema extraction and snapshot CRUD
//!
//! - POST   /api/v1/membership-dbs/{db_id}/extract
//! - GET    /api/v1/membership-dbs/metadata
//! - GET    /api/v1/membership-dbs/metadata/{metadata_id}
//! - DELETE /api/v1/membership-dbs/metadata/{metadata_id}

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use memberdb_commons::{AppError, MetadataId, TenantDbId};

use crate::actions;
use crate::auth::authorize;
use crate::errors::HttpError;
use crate::state::AppState;

/// Runs a fresh extraction and returns the upserted snapshot.
pub async fn extract_metadata(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, HttpError> {
    let caller = authorize(&req, &state, actions::EXTRACT_METADATA).await?;

    // An unparseable id cannot name anything the caller owns.
    let db_id: TenantDbId = path
        .parse()
        .map_err(|_| AppError::MembershipDbNotFound)?;

    let snapshot = state.introspector.extract(db_id, &caller).await?;
    Ok(HttpResponse::Created().json(json!({
        "metadata_id": snapshot.id,
        "table_names": snapshot.table_names(),
        "metadata": snapshot,
    })))
}

pub async fn list_metadata(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, HttpError> {
    let caller = authorize(&req, &state, actions::LIST_METADATA).await?;
    let summaries = state.metadata.list(&caller).await?;
    Ok(HttpResponse::Ok().json(summaries))
}

pub async fn get_metadata(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, HttpError> {
    let caller = authorize(&req, &state, actions::GET_METADATA).await?;

    let metadata_id: MetadataId = path.parse().map_err(|_| AppError::MetadataNotFound)?;
    let snapshot = state.metadata.get(metadata_id, &caller).await?;
    Ok(HttpResponse::Ok().json(json!({
        "table_names": snapshot.table_names(),
        "metadata": snapshot,
    })))
}

pub async fn delete_metadata(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, HttpError> {
    let caller = authorize(&req, &state, actions::DELETE_METADATA).await?;

    let metadata_id: MetadataId = path.parse().map_err(|_| AppError::MetadataNotFound)?;
    state.metadata.delete(metadata_id, &caller).await?;
    Ok(HttpResponse::NoContent().finish())
}
