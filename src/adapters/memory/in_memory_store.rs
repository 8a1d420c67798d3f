//! In-Memory Store Adapter
//!
//! All users, friends, and messages live behind a single `RwLock`, so a
//! unit of work applies atomically by validating every operation against a
//! scratch copy before swapping it in.
//!
//! Failures can be injected per operation to exercise error paths.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{Message, MessagePage, MessageRole, PageRequest};
use crate::domain::foundation::{FriendId, MessageId, Timestamp, UserId};
use crate::domain::friend::Friend;
use crate::domain::quota::{DailyQuota, SubscriptionTier};
use crate::domain::user::UserAccount;
use crate::ports::{
    FriendRepository, FriendSummary, MessageRepository, RepositoryError, StoreOperation,
    UnitOfWork, UserRepository,
};

/// Operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    Commit,
    IncrementMessagesUsed,
    TouchFriend,
    SaveQuota,
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    users: HashMap<UserId, UserAccount>,
    friends: HashMap<FriendId, Friend>,
    messages: HashMap<MessageId, Message>,
}

impl StoreState {
    fn apply(&mut self, operation: StoreOperation) -> Result<(), RepositoryError> {
        match operation {
            StoreOperation::CreateFriend(friend) => {
                if self.friends.contains_key(&friend.id) {
                    return Err(RepositoryError::Conflict(format!("friend {}", friend.id)));
                }
                self.friends.insert(friend.id, friend);
            }
            StoreOperation::CreateMessage(message) => {
                if !self.friends.contains_key(&message.friend_id) {
                    return Err(RepositoryError::NotFound(format!(
                        "friend {}",
                        message.friend_id
                    )));
                }
                if self.messages.contains_key(&message.id) {
                    return Err(RepositoryError::Conflict(format!("message {}", message.id)));
                }
                self.messages.insert(message.id, message);
            }
            StoreOperation::DeleteMessage(id) => {
                self.messages
                    .remove(&id)
                    .ok_or_else(|| RepositoryError::NotFound(format!("message {}", id)))?;
            }
            StoreOperation::MarkDefaultFriendsSeeded(user_id) => {
                let user = self
                    .users
                    .get_mut(&user_id)
                    .ok_or_else(|| RepositoryError::NotFound(format!("user {}", user_id)))?;
                if user.default_friends_seeded {
                    return Err(RepositoryError::Conflict(format!(
                        "user {} already seeded",
                        user_id
                    )));
                }
                user.default_friends_seeded = true;
            }
        }
        Ok(())
    }

    fn conversation(&self, friend_id: &FriendId) -> Vec<&Message> {
        let mut rows: Vec<&Message> = self
            .messages
            .values()
            .filter(|m| &m.friend_id == friend_id && !m.is_system())
            .collect();
        rows.sort_by_key(|m| conversation_order(m));
        rows
    }
}

fn conversation_order(message: &Message) -> (i64, MessageId) {
    (message.created_at.as_unix_micros(), message.id)
}

/// Shared in-memory implementation of all storage ports.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
    failures: Arc<RwLock<HashSet<FailurePoint>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call at `point` fail with a database error.
    pub async fn fail_on(&self, point: FailurePoint) {
        self.failures.write().await.insert(point);
    }

    /// Clears an injected failure.
    pub async fn recover(&self, point: FailurePoint) {
        self.failures.write().await.remove(&point);
    }

    async fn check(&self, point: FailurePoint) -> Result<(), RepositoryError> {
        if self.failures.read().await.contains(&point) {
            return Err(RepositoryError::database(format!("injected failure at {:?}", point)));
        }
        Ok(())
    }

    /// Inserts or replaces a user row directly.
    pub async fn put_user(&self, user: UserAccount) {
        self.state.write().await.users.insert(user.id.clone(), user);
    }

    /// Inserts a message row directly, bypassing the unit of work.
    pub async fn put_message(&self, message: Message) {
        self.state.write().await.messages.insert(message.id, message);
    }

    pub async fn set_tier(&self, user_id: &UserId, tier: SubscriptionTier) {
        if let Some(user) = self.state.write().await.users.get_mut(user_id) {
            user.tier = tier;
        }
    }

    pub async fn user(&self, user_id: &UserId) -> Option<UserAccount> {
        self.state.read().await.users.get(user_id).cloned()
    }

    pub async fn friend(&self, friend_id: &FriendId) -> Option<Friend> {
        self.state.read().await.friends.get(friend_id).cloned()
    }

    /// Every message of a conversation, system rows included, oldest first.
    pub async fn all_messages(&self, friend_id: &FriendId) -> Vec<Message> {
        let state = self.state.read().await;
        let mut rows: Vec<Message> = state
            .messages
            .values()
            .filter(|m| &m.friend_id == friend_id)
            .cloned()
            .collect();
        rows.sort_by_key(conversation_order);
        rows
    }

    pub async fn message_count(&self) -> usize {
        self.state.read().await.messages.len()
    }
}

#[async_trait]
impl FriendRepository for InMemoryStore {
    async fn find_by_id(&self, id: &FriendId) -> Result<Option<Friend>, RepositoryError> {
        Ok(self.state.read().await.friends.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<FriendSummary>, RepositoryError> {
        let state = self.state.read().await;
        let mut summaries: Vec<FriendSummary> = state
            .friends
            .values()
            .filter(|f| &f.user_id == user_id)
            .map(|friend| FriendSummary {
                message_count: state
                    .messages
                    .values()
                    .filter(|m| m.friend_id == friend.id && !m.is_system())
                    .count() as u64,
                friend: friend.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| {
            b.friend
                .updated_at
                .cmp(&a.friend.updated_at)
                .then_with(|| b.friend.id.cmp(&a.friend.id))
        });
        Ok(summaries)
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<u32, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.friends.values().filter(|f| &f.user_id == user_id).count() as u32)
    }

    async fn create(&self, friend: &Friend) -> Result<(), RepositoryError> {
        self.state
            .write()
            .await
            .apply(StoreOperation::CreateFriend(friend.clone()))
    }

    async fn delete(&self, id: &FriendId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state
            .friends
            .remove(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("friend {}", id)))?;
        state.messages.retain(|_, m| &m.friend_id != id);
        Ok(())
    }

    async fn touch(&self, id: &FriendId, at: Timestamp) -> Result<(), RepositoryError> {
        self.check(FailurePoint::TouchFriend).await?;
        let mut state = self.state.write().await;
        let friend = state
            .friends
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("friend {}", id)))?;
        friend.touch(at);
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for InMemoryStore {
    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, RepositoryError> {
        Ok(self.state.read().await.messages.get(id).cloned())
    }

    async fn recent_for_friend(
        &self,
        friend_id: &FriendId,
        limit: u32,
    ) -> Result<Vec<Message>, RepositoryError> {
        let state = self.state.read().await;
        let rows = state.conversation(friend_id);
        let skip = rows.len().saturating_sub(limit as usize);
        Ok(rows.into_iter().skip(skip).cloned().collect())
    }

    async fn find_preceding_user_message(
        &self,
        friend_id: &FriendId,
        before: Timestamp,
    ) -> Result<Option<Message>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .conversation(friend_id)
            .into_iter()
            .rev()
            .find(|m| m.role == MessageRole::User && m.created_at.is_before(&before))
            .cloned())
    }

    async fn page_for_friend(
        &self,
        friend_id: &FriendId,
        page: PageRequest,
    ) -> Result<MessagePage, RepositoryError> {
        let state = self.state.read().await;
        let rows: Vec<Message> = state
            .conversation(friend_id)
            .into_iter()
            .rev()
            .filter(|m| page.before.map_or(true, |cursor| cursor.is_after(m)))
            .take(page.limit as usize + 1)
            .cloned()
            .collect();
        Ok(MessagePage::from_newest_first(rows, page.limit))
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .values()
            .filter(|m| &m.user_id == user_id && !m.is_system())
            .count() as u64)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn create(&self, user: &UserAccount) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.id) {
            return Err(RepositoryError::Conflict(format!("user {}", user.id)));
        }
        state.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn save_quota(&self, id: &UserId, quota: DailyQuota) -> Result<(), RepositoryError> {
        self.check(FailurePoint::SaveQuota).await?;
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", id)))?;
        user.quota = quota;
        Ok(())
    }

    async fn increment_messages_used(&self, id: &UserId) -> Result<(), RepositoryError> {
        self.check(FailurePoint::IncrementMessagesUsed).await?;
        let mut state = self.state.write().await;
        let user = state
            .users
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", id)))?;
        user.quota.messages_used_today += 1;
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryStore {
    async fn commit(&self, operations: Vec<StoreOperation>) -> Result<(), RepositoryError> {
        self.check(FailurePoint::Commit).await?;

        let mut state = self.state.write().await;
        let mut scratch = state.clone();
        for operation in operations {
            scratch.apply(operation)?;
        }
        *state = scratch;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::friend::FriendProfile;
    use crate::domain::quota::QuotaPolicy;

    fn user_id() -> UserId {
        UserId::new("user-1").unwrap()
    }

    async fn store_with_friend() -> (InMemoryStore, Friend) {
        let store = InMemoryStore::new();
        let now = Timestamp::now();
        store
            .put_user(UserAccount::provision(user_id(), None, now, &QuotaPolicy::default()))
            .await;
        let friend = Friend::create(
            user_id(),
            FriendProfile::new("Luna", "A calm and thoughtful listener."),
            now,
        )
        .unwrap();
        FriendRepository::create(&store, &friend).await.unwrap();
        (store, friend)
    }

    fn message_at(friend: &Friend, role: MessageRole, at: Timestamp) -> Message {
        Message::new(friend.id, friend.user_id.clone(), role, "text", at)
    }

    mod unit_of_work {
        use super::*;

        #[tokio::test]
        async fn applies_all_operations() {
            let (store, friend) = store_with_friend().await;
            let now = Timestamp::now();
            let a = message_at(&friend, MessageRole::User, now);
            let b = message_at(&friend, MessageRole::Assistant, now.plus_micros(1));

            store
                .commit(vec![
                    StoreOperation::CreateMessage(a),
                    StoreOperation::CreateMessage(b),
                ])
                .await
                .unwrap();

            assert_eq!(store.message_count().await, 2);
        }

        #[tokio::test]
        async fn failing_operation_rolls_back_everything() {
            let (store, friend) = store_with_friend().await;
            let a = message_at(&friend, MessageRole::User, Timestamp::now());

            let result = store
                .commit(vec![
                    StoreOperation::CreateMessage(a),
                    StoreOperation::DeleteMessage(MessageId::new()),
                ])
                .await;

            assert!(matches!(result, Err(RepositoryError::NotFound(_))));
            assert_eq!(store.message_count().await, 0);
        }

        #[tokio::test]
        async fn injected_commit_failure() {
            let (store, friend) = store_with_friend().await;
            store.fail_on(FailurePoint::Commit).await;

            let a = message_at(&friend, MessageRole::User, Timestamp::now());
            let result = store.commit(vec![StoreOperation::CreateMessage(a)]).await;

            assert!(matches!(result, Err(RepositoryError::Database(_))));
            store.recover(FailurePoint::Commit).await;
            assert!(store.commit(vec![]).await.is_ok());
        }
    }

    mod messages {
        use super::*;

        #[tokio::test]
        async fn recent_returns_newest_tail_ascending_without_system_rows() {
            let (store, friend) = store_with_friend().await;
            let start = Timestamp::now();
            store
                .put_message(message_at(&friend, MessageRole::System, start))
                .await;
            for i in 1..=5 {
                store
                    .put_message(message_at(&friend, MessageRole::User, start.plus_millis(i)))
                    .await;
            }

            let recent = store.recent_for_friend(&friend.id, 3).await.unwrap();

            assert_eq!(recent.len(), 3);
            assert_eq!(recent[0].created_at, start.plus_millis(3));
            assert_eq!(recent[2].created_at, start.plus_millis(5));
        }

        #[tokio::test]
        async fn preceding_user_message_is_strictly_earlier() {
            let (store, friend) = store_with_friend().await;
            let t = Timestamp::now();
            let user_msg = message_at(&friend, MessageRole::User, t);
            let reply = message_at(&friend, MessageRole::Assistant, t.plus_micros(1));
            store.put_message(user_msg.clone()).await;
            store.put_message(reply.clone()).await;

            let found = store
                .find_preceding_user_message(&friend.id, reply.created_at)
                .await
                .unwrap();
            assert_eq!(found.map(|m| m.id), Some(user_msg.id));

            let none = store
                .find_preceding_user_message(&friend.id, user_msg.created_at)
                .await
                .unwrap();
            assert!(none.is_none());
        }

        #[tokio::test]
        async fn pages_walk_backward_to_the_start() {
            let (store, friend) = store_with_friend().await;
            let start = Timestamp::now();
            for i in 0..5 {
                store
                    .put_message(message_at(&friend, MessageRole::User, start.plus_millis(i)))
                    .await;
            }

            let first = store
                .page_for_friend(&friend.id, PageRequest::new(None, Some(2)))
                .await
                .unwrap();
            assert_eq!(first.messages[1].created_at, start.plus_millis(4));
            let cursor = first.next_cursor.unwrap();

            let second = store
                .page_for_friend(&friend.id, PageRequest::new(Some(cursor), Some(2)))
                .await
                .unwrap();
            assert_eq!(second.messages[0].created_at, start.plus_millis(1));

            let last = store
                .page_for_friend(&friend.id, PageRequest::new(second.next_cursor, Some(2)))
                .await
                .unwrap();
            assert_eq!(last.messages.len(), 1);
            assert!(last.next_cursor.is_none());
        }
    }

    mod friends {
        use super::*;

        #[tokio::test]
        async fn delete_cascades_to_messages() {
            let (store, friend) = store_with_friend().await;
            store
                .put_message(message_at(&friend, MessageRole::User, Timestamp::now()))
                .await;

            store.delete(&friend.id).await.unwrap();

            assert!(store.friend(&friend.id).await.is_none());
            assert_eq!(store.message_count().await, 0);
            assert!(matches!(
                store.delete(&friend.id).await,
                Err(RepositoryError::NotFound(_))
            ));
        }

        #[tokio::test]
        async fn list_orders_by_recent_activity_with_counts() {
            let (store, older) = store_with_friend().await;
            let newer = Friend::create(
                user_id(),
                FriendProfile::new("Max", "An energetic and upbeat companion."),
                Timestamp::now(),
            )
            .unwrap();
            FriendRepository::create(&store, &newer).await.unwrap();
            store
                .put_message(message_at(&older, MessageRole::User, Timestamp::now()))
                .await;
            store
                .put_message(message_at(&older, MessageRole::System, Timestamp::now()))
                .await;
            store
                .touch(&older.id, Timestamp::now().plus_hours(1))
                .await
                .unwrap();

            let list = store.list_for_user(&user_id()).await.unwrap();

            assert_eq!(list[0].friend.id, older.id);
            assert_eq!(list[0].message_count, 1);
            assert_eq!(list[1].message_count, 0);
            let total: u64 = list.iter().map(|s| s.message_count).sum();
            assert_eq!(MessageRepository::count_for_user(&store, &user_id()).await.unwrap(), total);
        }
    }

    mod users {
        use super::*;

        #[tokio::test]
        async fn increment_adds_one() {
            let (store, _) = store_with_friend().await;
            store.increment_messages_used(&user_id()).await.unwrap();
            store.increment_messages_used(&user_id()).await.unwrap();

            let user = store.user(&user_id()).await.unwrap();
            assert_eq!(user.quota.messages_used_today, 2);
        }

        #[tokio::test]
        async fn create_twice_conflicts() {
            let store = InMemoryStore::new();
            let user = UserAccount::provision(
                user_id(),
                None,
                Timestamp::now(),
                &QuotaPolicy::default(),
            );
            UserRepository::create(&store, &user).await.unwrap();
            assert!(matches!(
                UserRepository::create(&store, &user).await,
                Err(RepositoryError::Conflict(_))
            ));
        }
    }
}
