//! HTTP adapter for conversation endpoints.
//!
//! The streaming send speaks server-sent events. Each event is named after
//! its payload's `type` (`delta`, `final`, `error`) and carries the JSON
//! encoding of a `StreamEvent`.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use routes::conversation_routes;
