//! Single-owner records.
//!
//! A friend and every message in its conversation belong to one user.
//! Handlers load the record, then call `check_ownership` before touching it.

use super::{DomainError, ErrorCode, UserId};

pub trait OwnedByUser {
    fn owner_id(&self) -> &UserId;

    fn is_owner(&self, user_id: &UserId) -> bool {
        self.owner_id() == user_id
    }

    /// `Unauthorized` unless `user_id` owns the record.
    fn check_ownership(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.is_owner(user_id) {
            return Ok(());
        }
        Err(
            DomainError::new(ErrorCode::Unauthorized, "Record belongs to another user")
                .with_detail("requested_by", user_id.to_string()),
        )
    }
}
