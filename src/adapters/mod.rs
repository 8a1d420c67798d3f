//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `ai` - completion backends (OpenAI-compatible, scripted mock)
//! - `auth` - bearer token validation
//! - `http` - axum REST and SSE API
//! - `memory` - in-process storage for tests and local runs
//! - `postgres` - sqlx storage
//! - `sse` - server-sent event line parsing, shared by the AI adapter and the client

pub mod ai;
pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod sse;
