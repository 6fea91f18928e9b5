//! API route configuration
//!
//! All endpoints live under the /api/v1 prefix:
//! - GET    /api/v1/healthcheck
//! - POST   /api/v1/memberships
//! - POST   /api/v1/membership-dbs
//! - POST   /api/v1/membership-dbs/{db_id}/extract
//! - GET    /api/v1/membership-dbs/metadata
//! - GET    /api/v1/membership-dbs/metadata/{metadata_id}
//! - DELETE /api/v1/membership-dbs/metadata/{metadata_id}
//! - POST   /api/v1/membership-dbs/{metadata_id}/classify/{column_id}

use actix_web::web;

use crate::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/healthcheck", web::get().to(handlers::healthcheck))
            .route("/memberships", web::post().to(handlers::create_membership))
            .route("/membership-dbs", web::post().to(handlers::create_database))
            .route(
                "/membership-dbs/metadata",
                web::get().to(handlers::list_metadata),
            )
            .route(
                "/membership-dbs/metadata/{metadata_id}",
                web::get().to(handlers::get_metadata),
            )
            .route(
                "/membership-dbs/metadata/{metadata_id}",
                web::delete().to(handlers::delete_metadata),
            )
            .route(
                "/membership-dbs/{db_id}/extract",
                web::post().to(handlers::extract_metadata),
            )
            .route(
                "/membership-dbs/{metadata_id}/classify/{column_id}",
                web::post().to(handlers::classify_column),
            ),
    );
}
