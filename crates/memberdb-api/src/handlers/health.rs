//! Health check endpoint

use actix_web::HttpResponse;
use serde_json::json;

/// GET /api/v1/healthcheck
pub async fn healthcheck() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
