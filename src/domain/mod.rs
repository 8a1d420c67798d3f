//! Domain layer - pure types and rules, no I/O.

pub mod conversation;
pub mod foundation;
pub mod friend;
pub mod quota;
pub mod user;
