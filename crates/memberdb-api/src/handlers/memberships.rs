//! Membership registration
//!
//! POST /api/v1/memberships creates a membership. Itself a protected
//! action: the caller needs `api.create_membership`.

use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use serde::Deserialize;

use memberdb_auth::password::{hash_password, validate_password};
use memberdb_commons::{AppError, Membership};

use crate::actions;
use crate::auth::authorize;
use crate::errors::HttpError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewMembershipRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role_id: Option<String>,
}

/// Hashes the password and persists the membership. The response is the
/// membership record, which serializes without its password field.
pub async fn create_membership(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<NewMembershipRequest>,
) -> Result<HttpResponse, HttpError> {
    let caller = authorize(&req, &state, actions::CREATE_MEMBERSHIP).await?;

    if body.username.trim().is_empty() {
        return Err(AppError::Validation("username must not be empty".to_string()).into());
    }
    validate_password(&body.password)?;

    let hashed = hash_password(&body.password).await?;
    let membership = Membership::new(body.username.clone(), hashed, body.role_id.clone());
    state.memberships.insert(&membership).await?;

    info!(
        "membership {} created by {}",
        membership.username, caller.username
    );
    Ok(HttpResponse::Created().json(membership))
}
