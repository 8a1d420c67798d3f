//! HTTP adapter for friend endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use routes::friend_routes;
