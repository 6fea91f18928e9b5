// Uniform HTTP error mapping

use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde::{Deserialize, Serialize};

use memberdb_commons::AppError;

/// The one error body every failure renders as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error_msg: String,
    pub error_code: String,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            error_msg: err.public_message(),
            error_code: err.error_code().to_string(),
        }
    }
}

/// Newtype letting handlers bubble `AppError` with `?`.
#[derive(Debug)]
pub struct HttpError(pub AppError);

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for HttpError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        // Internal detail reaches the log only; the body carries the
        // public message and stable code.
        if self.status_code().is_server_error() {
            error!("request failed: {}", self.0);
        }
        HttpResponse::build(self.status_code()).json(ErrorBody::from(&self.0))
    }
}
