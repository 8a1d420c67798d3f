//! HTTP DTOs for friend endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{FriendId, Timestamp};
use crate::domain::friend::{Friend, FriendProfile, Gender};
use crate::ports::FriendSummary;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/friends`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFriendRequest {
    #[serde(flatten)]
    pub profile: FriendProfile,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// A friend as the owner sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendResponse {
    pub id: FriendId,
    pub name: String,
    pub personality: String,
    pub age: Option<u16>,
    pub gender: Option<Gender>,
    pub traits: Vec<String>,
    pub voice: Option<String>,
    pub background: Option<String>,
    pub interests: Vec<String>,
    pub avatar: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Friend> for FriendResponse {
    fn from(friend: Friend) -> Self {
        Self {
            id: friend.id,
            name: friend.name,
            personality: friend.personality,
            age: friend.age,
            gender: friend.gender,
            traits: friend.traits,
            voice: friend.voice,
            background: friend.background,
            interests: friend.interests,
            avatar: friend.avatar,
            created_at: friend.created_at,
            updated_at: friend.updated_at,
        }
    }
}

/// One row of the friend list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendListItem {
    #[serde(flatten)]
    pub friend: FriendResponse,
    pub message_count: u64,
}

impl From<FriendSummary> for FriendListItem {
    fn from(summary: FriendSummary) -> Self {
        Self {
            friend: summary.friend.into(),
            message_count: summary.message_count,
        }
    }
}

/// Body of `GET /api/friends`, most recently active first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendListResponse {
    pub friends: Vec<FriendListItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    #[test]
    fn create_request_reads_flat_profile() {
        let json = r#"{
            "name": "Luna",
            "personality": "Warm and curious about everything",
            "traits": ["kind"],
            "gender": "female"
        }"#;

        let request: CreateFriendRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.profile.name, "Luna");
        assert_eq!(request.profile.traits, vec!["kind".to_string()]);
        assert_eq!(request.profile.gender, Some(Gender::Female));
        assert!(request.profile.interests.is_empty());
    }

    #[test]
    fn response_hides_owner() {
        let profile = FriendProfile::new("Luna", "Warm and curious about everything");
        let friend =
            Friend::create(UserId::new("user-1").unwrap(), profile, Timestamp::now()).unwrap();

        let json = serde_json::to_value(FriendResponse::from(friend)).unwrap();

        assert!(json.get("user_id").is_none());
        assert_eq!(json["name"], "Luna");
    }

    #[test]
    fn list_item_flattens_friend_fields() {
        let profile = FriendProfile::new("Luna", "Warm and curious about everything");
        let friend =
            Friend::create(UserId::new("user-1").unwrap(), profile, Timestamp::now()).unwrap();

        let item = FriendListItem::from(FriendSummary {
            friend,
            message_count: 3,
        });
        let json = serde_json::to_value(item).unwrap();

        assert_eq!(json["name"], "Luna");
        assert_eq!(json["message_count"], 3);
    }
}
