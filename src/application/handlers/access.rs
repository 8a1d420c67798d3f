//! Existence and ownership checks shared by the handlers.

use crate::application::ChatError;
use crate::domain::foundation::{FriendId, OwnedByUser, UserId};
use crate::domain::friend::Friend;
use crate::domain::user::UserAccount;
use crate::ports::{FriendRepository, UserRepository};

/// Loads a friend and verifies that `user_id` owns it.
pub(crate) async fn load_owned_friend(
    friends: &dyn FriendRepository,
    friend_id: &FriendId,
    user_id: &UserId,
) -> Result<Friend, ChatError> {
    let friend = friends
        .find_by_id(friend_id)
        .await?
        .ok_or_else(|| ChatError::friend_not_found(friend_id))?;

    friend
        .check_ownership(user_id)
        .map_err(|_| ChatError::Unauthorized)?;

    Ok(friend)
}

pub(crate) async fn load_user(
    users: &dyn UserRepository,
    user_id: &UserId,
) -> Result<UserAccount, ChatError> {
    users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ChatError::user_not_found(user_id))
}
