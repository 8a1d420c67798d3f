//! HTTP adapter for the caller's account.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::SeedDefaultsResponse;
pub use routes::account_routes;
