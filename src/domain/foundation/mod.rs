//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, error types, and the small traits
//! (ownership, state machines) that the rest of the domain builds on.

mod auth;
mod errors;
mod ids;
mod ownership;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{FriendId, MessageId, UserId};
pub use ownership::OwnedByUser;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
