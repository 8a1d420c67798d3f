//! Shared state for the HTTP adapter.

use std::sync::Arc;

use crate::application::handlers::{
    CreateFriendHandler, DeleteFriendHandler, EnsureUserHandler, GetConversationHandler,
    GetFriendHandler, GetStatsHandler, GetUsageHandler, ListFriendsHandler,
    RollbackMessageHandler, SeedDefaultFriendsHandler, SendMessageHandler,
};
use crate::domain::conversation::DEFAULT_CONTEXT_WINDOW;
use crate::domain::quota::QuotaPolicy;
use crate::ports::{
    AIProvider, FriendRepository, GenerationParams, MessageRepository, SessionValidator,
    UnitOfWork, UserRepository,
};

/// Dependencies shared by every route.
///
/// Cloned per request; everything inside is behind an `Arc`. Handlers are
/// built on demand from the ports.
#[derive(Clone)]
pub struct AppState {
    pub friends: Arc<dyn FriendRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub users: Arc<dyn UserRepository>,
    pub unit_of_work: Arc<dyn UnitOfWork>,
    pub ai_provider: Arc<dyn AIProvider>,
    pub session_validator: Arc<dyn SessionValidator>,
    pub policy: QuotaPolicy,
    pub context_window: usize,
    pub params: GenerationParams,
}

impl AppState {
    pub fn new(
        friends: Arc<dyn FriendRepository>,
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
        unit_of_work: Arc<dyn UnitOfWork>,
        ai_provider: Arc<dyn AIProvider>,
        session_validator: Arc<dyn SessionValidator>,
    ) -> Self {
        Self {
            friends,
            messages,
            users,
            unit_of_work,
            ai_provider,
            session_validator,
            policy: QuotaPolicy::default(),
            context_window: DEFAULT_CONTEXT_WINDOW,
            params: GenerationParams::default(),
        }
    }

    pub fn with_policy(mut self, policy: QuotaPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context_window = window;
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn ensure_user_handler(&self) -> EnsureUserHandler {
        EnsureUserHandler::new(self.users.clone()).with_policy(self.policy)
    }

    pub fn create_friend_handler(&self) -> CreateFriendHandler {
        CreateFriendHandler::new(self.friends.clone(), self.users.clone()).with_policy(self.policy)
    }

    pub fn get_friend_handler(&self) -> GetFriendHandler {
        GetFriendHandler::new(self.friends.clone())
    }

    pub fn list_friends_handler(&self) -> ListFriendsHandler {
        ListFriendsHandler::new(self.friends.clone())
    }

    pub fn delete_friend_handler(&self) -> DeleteFriendHandler {
        DeleteFriendHandler::new(self.friends.clone())
    }

    pub fn send_message_handler(&self) -> SendMessageHandler {
        SendMessageHandler::new(
            self.friends.clone(),
            self.messages.clone(),
            self.users.clone(),
            self.unit_of_work.clone(),
            self.ai_provider.clone(),
        )
        .with_policy(self.policy)
        .with_context_window(self.context_window)
        .with_params(self.params)
    }

    pub fn rollback_message_handler(&self) -> RollbackMessageHandler {
        RollbackMessageHandler::new(
            self.friends.clone(),
            self.messages.clone(),
            self.unit_of_work.clone(),
        )
    }

    pub fn get_conversation_handler(&self) -> GetConversationHandler {
        GetConversationHandler::new(self.friends.clone(), self.messages.clone())
    }

    pub fn get_usage_handler(&self) -> GetUsageHandler {
        GetUsageHandler::new(self.users.clone()).with_policy(self.policy)
    }

    pub fn get_stats_handler(&self) -> GetStatsHandler {
        GetStatsHandler::new(
            self.friends.clone(),
            self.messages.clone(),
            self.users.clone(),
        )
    }

    pub fn seed_defaults_handler(&self) -> SeedDefaultFriendsHandler {
        SeedDefaultFriendsHandler::new(self.users.clone(), self.unit_of_work.clone())
    }
}
