//! In-memory storage adapter.
//!
//! Implements every storage port over one shared lock. Used by tests and
//! by local runs without a database.

mod in_memory_store;

pub use in_memory_store::{FailurePoint, InMemoryStore};
