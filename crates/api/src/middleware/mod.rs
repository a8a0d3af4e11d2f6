//! Request middleware and extractors.

pub mod auth;
pub mod request_id;

pub use auth::{CurrentUser, OptionalAuth, RequireAdmin, RequireAuth};
pub use request_id::request_id_middleware;
