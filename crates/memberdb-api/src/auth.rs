// Per-request authorization helper

use actix_web::http::header;
use actix_web::HttpRequest;

use memberdb_auth::parse_basic_auth_header;
use memberdb_commons::{AppError, Membership};

use crate::errors::HttpError;
use crate::state::AppState;

/// Parse the Basic auth header and run the gate for `action`.
///
/// `action` must be the endpoint's own constant: the permission checked
/// is `api.<action>` and is bound to the operation, never to request
/// data. A missing or unreadable header gets the same uniform 401 as bad
/// credentials.
pub async fn authorize(
    req: &HttpRequest,
    state: &AppState,
    action: &str,
) -> Result<Membership, HttpError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(HttpError(AppError::Unauthorized))?;

    let credentials = parse_basic_auth_header(header_value)?;
    let membership = state
        .gate
        .authenticate_and_authorize(&credentials, action)
        .await?;
    Ok(membership)
}
