//! Fixtures shared by handler tests.

use std::sync::Arc;

use crate::adapters::ai::MockAIProvider;
use crate::adapters::memory::InMemoryStore;
use crate::domain::conversation::{Message, MessageRole};
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::friend::{Friend, FriendProfile};
use crate::domain::quota::QuotaPolicy;
use crate::domain::user::UserAccount;
use crate::ports::FriendRepository;

pub(crate) fn owner() -> UserId {
    UserId::new("user-1").unwrap()
}

pub(crate) fn stranger() -> UserId {
    UserId::new("user-2").unwrap()
}

pub(crate) struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub ai: Arc<MockAIProvider>,
    pub friend: Friend,
}

impl Fixture {
    /// A store holding two users and one friend owned by `owner()`.
    pub async fn new(ai: MockAIProvider) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let now = Timestamp::now();
        let policy = QuotaPolicy::default();
        store
            .put_user(UserAccount::provision(owner(), Some("Ada".into()), now, &policy))
            .await;
        store
            .put_user(UserAccount::provision(stranger(), None, now, &policy))
            .await;

        let friend = Friend::create(
            owner(),
            FriendProfile::new("Luna", "A wise and mystical guide."),
            now.minus_days(1),
        )
        .unwrap();
        FriendRepository::create(store.as_ref(), &friend).await.unwrap();

        Self {
            store,
            ai: Arc::new(ai),
            friend,
        }
    }

    /// Inserts a message `offset_ms` after a fixed base time.
    pub async fn seed_message(&self, role: MessageRole, content: &str, offset_ms: i64) -> Message {
        let base = self.friend.created_at;
        let message = Message::new(
            self.friend.id,
            owner(),
            role,
            content,
            base.plus_millis(offset_ms),
        );
        self.store.put_message(message.clone()).await;
        message
    }

    pub async fn set_used_today(&self, used: u32) {
        let mut user = self.store.user(&owner()).await.unwrap();
        user.quota.messages_used_today = used;
        self.store.put_user(user).await;
    }
}
