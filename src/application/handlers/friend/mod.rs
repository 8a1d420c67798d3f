//! Friend management handlers.

mod create_friend;
mod delete_friend;
mod get_friend;
mod list_friends;

pub use create_friend::{CreateFriendCommand, CreateFriendHandler};
pub use delete_friend::{DeleteFriendCommand, DeleteFriendHandler};
pub use get_friend::{GetFriendHandler, GetFriendQuery};
pub use list_friends::{ListFriendsHandler, ListFriendsQuery};
