//! HTTP adapter - REST and SSE API over axum.
//!
//! Each area has its own `dto`, `handlers`, and `routes` modules:
//! - `friend` - friend CRUD
//! - `conversation` - history, sends (plain and streamed), rollback
//! - `account` - usage, statistics, default friends
//!
//! `router::app_router` assembles them behind the auth middleware.

pub mod account;
pub mod conversation;
pub mod friend;
pub mod middleware;

mod error;
mod router;
mod state;

pub use error::{ApiError, ErrorResponse};
pub use router::{app_router, RouterOptions};
pub use state::AppState;
