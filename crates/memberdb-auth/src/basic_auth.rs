// HTTP Basic Authentication parsing

use base64::prelude::*;

use memberdb_commons::{AppError, AppResult};

/// Transport credentials recovered from an Authorization header.
#[derive(Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

/// Parse an `Authorization: Basic <base64(username:password)>` header.
///
/// Every malformation (missing prefix, bad base64, bad UTF-8, missing
/// colon) maps to the same `Unauthorized` error as a wrong password;
/// a broken header must not be distinguishable from bad credentials.
pub fn parse_basic_auth_header(auth_header: &str) -> AppResult<BasicCredentials> {
    let encoded = auth_header
        .strip_prefix("Basic ")
        .ok_or(AppError::Unauthorized)?;

    let decoded = BASE64_STANDARD
        .decode(encoded.trim().as_bytes())
        .map_err(|_| AppError::Unauthorized)?;

    let decoded = String::from_utf8(decoded).map_err(|_| AppError::Unauthorized)?;

    let (username, password) = decoded.split_once(':').ok_or(AppError::Unauthorized)?;

    Ok(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}
