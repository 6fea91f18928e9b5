//! Column content classification
//!
//! POST /api/v1/membership-dbs/{metadata_id}/classify/{column_id}?count=N

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use memberdb_commons::{AppError, ColumnId, MetadataId};

use crate::actions;
use crate::auth::authorize;
use crate::errors::HttpError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ClassifyQuery {
    pub count: Option<u32>,
}

pub async fn classify_column(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    query: web::Query<ClassifyQuery>,
) -> Result<HttpResponse, HttpError> {
    let caller = authorize(&req, &state, actions::CLASSIFY_COLUMN).await?;

    let (metadata_raw, column_raw) = path.into_inner();
    let metadata_id: MetadataId = metadata_raw.parse().map_err(|_| AppError::MetadataNotFound)?;
    let column_id: ColumnId = column_raw.parse().map_err(|_| AppError::ColumnNotFound)?;

    let groups = state
        .classifier
        .classify(metadata_id, column_id, &caller, query.count)
        .await?;
    Ok(HttpResponse::Ok().json(groups))
}
