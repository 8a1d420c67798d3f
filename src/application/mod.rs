//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Writes (send, rollback, create, delete, seed) and reads (conversation
//! pages, friend lists, usage) live in separate handlers.

mod error;
pub mod handlers;

pub use error::ChatError;
pub use handlers::*;
