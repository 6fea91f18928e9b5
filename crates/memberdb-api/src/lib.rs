// MemberDB HTTP surface
// actix-web handlers, route wiring and the uniform error body. Every
// protected handler authorizes through the gate with its own action
// constant before touching a service.

pub mod actions;
pub mod auth;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use errors::{ErrorBody, HttpError};
pub use routes::configure_routes;
pub use state::AppState;
