//! HTTP DTOs for account endpoints.
//!
//! Usage and statistics are returned as their domain types.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::FriendId;

/// Body of `POST /api/me/seed-defaults`. Empty when already seeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedDefaultsResponse {
    pub friend_ids: Vec<FriendId>,
}
