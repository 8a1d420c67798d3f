//! SendMessage command handler.
//!
//! Runs one exchange with a friend: checks, quota, prompt assembly, the
//! completion relay, and persistence. Available as a live event stream or
//! as a single call that returns once the exchange is stored.

use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::handlers::access::{load_owned_friend, load_user};
use crate::application::ChatError;
use crate::domain::conversation::{
    validate_outgoing, ContextBuilder, Message, RelayPhase, ReplyBuffer, StreamEvent,
};
use crate::domain::foundation::{FriendId, StateMachine, Timestamp, UserId};
use crate::domain::quota::{QuotaDecision, QuotaPolicy};
use crate::ports::{
    AIProvider, ChunkStream, CompletionRequest, FriendRepository, GenerationParams,
    MessageRepository, RequestMetadata, StoreOperation, UnitOfWork, UserRepository,
};

/// Command to send a message to a friend.
#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub user_id: UserId,
    pub friend_id: FriendId,
    pub content: String,
}

impl SendMessageCommand {
    pub fn new(user_id: UserId, friend_id: FriendId, content: impl Into<String>) -> Self {
        Self {
            user_id,
            friend_id,
            content: content.into(),
        }
    }
}

/// The persisted exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageResult {
    pub user_message: Message,
    pub assistant_message: Message,
    /// Set when the quota or activity follow-up failed.
    pub warning: Option<String>,
}

/// An exchange that has passed every check and is waiting for its reply.
#[derive(Debug, Clone)]
struct PendingExchange {
    user_id: UserId,
    friend_id: FriendId,
    content: String,
    received_at: Timestamp,
}

/// Records a completed exchange.
#[derive(Clone)]
pub struct ExchangePersister {
    friends: Arc<dyn FriendRepository>,
    users: Arc<dyn UserRepository>,
    unit_of_work: Arc<dyn UnitOfWork>,
}

impl ExchangePersister {
    pub fn new(
        friends: Arc<dyn FriendRepository>,
        users: Arc<dyn UserRepository>,
        unit_of_work: Arc<dyn UnitOfWork>,
    ) -> Self {
        Self {
            friends,
            users,
            unit_of_work,
        }
    }

    /// Writes both messages atomically, then runs the follow-up.
    async fn persist(
        &self,
        exchange: PendingExchange,
        reply: String,
    ) -> Result<SendMessageResult, ChatError> {
        // The reply always sorts after the message that prompted it.
        let replied_at = Timestamp::now().max(exchange.received_at.plus_micros(1));

        let user_message = Message::user(
            exchange.friend_id,
            exchange.user_id.clone(),
            exchange.content,
            exchange.received_at,
        );
        let assistant_message = Message::assistant(
            exchange.friend_id,
            exchange.user_id.clone(),
            reply,
            replied_at,
        );

        self.unit_of_work
            .commit(vec![
                StoreOperation::CreateMessage(user_message.clone()),
                StoreOperation::CreateMessage(assistant_message.clone()),
            ])
            .await
            .map_err(|e| {
                error!(
                    user_id = %exchange.user_id,
                    friend_id = %exchange.friend_id,
                    error = %e,
                    "Failed to persist exchange after completion"
                );
                ChatError::Storage(e.to_string())
            })?;

        let warning = self
            .follow_up(&exchange.user_id, &exchange.friend_id, replied_at)
            .await;

        Ok(SendMessageResult {
            user_message,
            assistant_message,
            warning,
        })
    }

    /// Counts the message against the quota and bumps the friend's activity.
    ///
    /// Not retried. Failures leave the stored exchange in place.
    async fn follow_up(
        &self,
        user_id: &UserId,
        friend_id: &FriendId,
        at: Timestamp,
    ) -> Option<String> {
        let mut failures = Vec::new();

        if let Err(e) = self.users.increment_messages_used(user_id).await {
            warn!(%user_id, %friend_id, error = %e, "Failed to increment message count");
            failures.push("message count was not updated");
        }
        if let Err(e) = self.friends.touch(friend_id, at).await {
            warn!(%user_id, %friend_id, error = %e, "Failed to update friend activity");
            failures.push("friend activity was not updated");
        }

        if failures.is_empty() {
            None
        } else {
            Some(format!("Message saved, but {}", failures.join(" and ")))
        }
    }
}

/// Handler for sending messages.
pub struct SendMessageHandler {
    friends: Arc<dyn FriendRepository>,
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
    ai_provider: Arc<dyn AIProvider>,
    persister: ExchangePersister,
    policy: QuotaPolicy,
    context: ContextBuilder,
    params: GenerationParams,
}

impl SendMessageHandler {
    pub fn new(
        friends: Arc<dyn FriendRepository>,
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
        unit_of_work: Arc<dyn UnitOfWork>,
        ai_provider: Arc<dyn AIProvider>,
    ) -> Self {
        let persister = ExchangePersister::new(friends.clone(), users.clone(), unit_of_work);
        Self {
            friends,
            messages,
            users,
            ai_provider,
            persister,
            policy: QuotaPolicy::default(),
            context: ContextBuilder::default(),
            params: GenerationParams::default(),
        }
    }

    pub fn with_policy(mut self, policy: QuotaPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context = ContextBuilder::new(window);
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Sends and waits for the whole reply.
    pub async fn handle(&self, cmd: SendMessageCommand) -> Result<SendMessageResult, ChatError> {
        let (exchange, request) = self.prepare(cmd).await?;

        let response = self.ai_provider.complete(request).await.map_err(|e| {
            warn!(friend_id = %exchange.friend_id, error = %e, "Completion failed");
            ChatError::from(e)
        })?;

        let mut buffer = ReplyBuffer::new();
        buffer.push(&response.content);
        let reply = buffer
            .finish()
            .ok_or_else(|| ChatError::CompletionUnavailable("empty reply".to_string()))?;

        let result = self.persister.persist(exchange, reply).await?;
        info!(
            message_id = %result.assistant_message.id,
            friend_id = %result.assistant_message.friend_id,
            "Exchange persisted"
        );
        Ok(result)
    }

    /// Sends and streams the reply as it arrives.
    ///
    /// Every check runs before this returns, so a returned receiver means the
    /// backend stream is open. The channel then carries deltas followed by
    /// one `Final` or `Error` event.
    pub async fn handle_stream(
        &self,
        cmd: SendMessageCommand,
    ) -> Result<mpsc::Receiver<StreamEvent>, ChatError> {
        let (exchange, request) = self.prepare(cmd).await?;

        let stream = self.ai_provider.stream_complete(request).await.map_err(|e| {
            warn!(friend_id = %exchange.friend_id, error = %e, "Completion stream failed to open");
            ChatError::from(e)
        })?;

        let (tx, rx) = mpsc::channel(32);
        let persister = self.persister.clone();
        tokio::spawn(async move {
            let friend_id = exchange.friend_id;
            let phase = relay(stream, tx, persister, exchange).await;
            debug!(%friend_id, ?phase, "Relay finished");
        });

        Ok(rx)
    }

    /// Checks, quota, and prompt assembly. No side effects beyond a lazy
    /// quota reset.
    async fn prepare(
        &self,
        cmd: SendMessageCommand,
    ) -> Result<(PendingExchange, CompletionRequest), ChatError> {
        // 1. Validate content
        validate_outgoing(&cmd.content)?;

        // 2. Existence and ownership
        let friend =
            load_owned_friend(self.friends.as_ref(), &cmd.friend_id, &cmd.user_id).await?;
        let mut user = load_user(self.users.as_ref(), &cmd.user_id).await?;

        // 3. Quota, before any completion call
        let now = Timestamp::now();
        let limits = self.policy.limits_for(user.tier);
        let check = user
            .quota
            .check_and_reserve(&limits, now, self.policy.reset_period_hours);
        if check.reset_applied {
            self.users.save_quota(&user.id, user.quota).await?;
            debug!(user_id = %user.id, "Daily quota reset");
        }
        if let QuotaDecision::Deny { limit } = check.decision {
            info!(user_id = %user.id, limit, "Daily message limit reached");
            return Err(ChatError::QuotaExceeded { limit });
        }

        // 4. Prompt
        let history = self
            .messages
            .recent_for_friend(&friend.id, self.context.window() as u32)
            .await?;
        let context = self.context.build(&friend, &user, &history, &cmd.content);
        if context.was_truncated() {
            debug!(friend_id = %friend.id, dropped = context.truncated_count, "History truncated");
        }

        let request = CompletionRequest::new(RequestMetadata::new(
            cmd.user_id.clone(),
            friend.id,
            format!("send-{}", Uuid::new_v4()),
        ))
        .with_messages(context.into_messages())
        .with_params(self.params);

        let exchange = PendingExchange {
            user_id: cmd.user_id,
            friend_id: friend.id,
            content: cmd.content,
            received_at: now,
        };
        Ok((exchange, request))
    }
}

/// Drives one streamed completion to a terminal phase.
///
/// If the receiver goes away before the reply is complete, reading stops
/// and nothing is stored. Once `Finalizing` is reached the exchange is
/// persisted whether or not anyone is still listening.
async fn relay(
    mut stream: ChunkStream,
    tx: mpsc::Sender<StreamEvent>,
    persister: ExchangePersister,
    exchange: PendingExchange,
) -> RelayPhase {
    let mut phase = RelayPhase::Opening;
    let mut buffer = ReplyBuffer::new();

    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                if buffer.push(&chunk.delta) {
                    if phase == RelayPhase::Opening {
                        phase = RelayPhase::Streaming;
                    }
                    if tx.send(StreamEvent::delta(chunk.delta)).await.is_err() {
                        debug!(friend_id = %exchange.friend_id, "Receiver dropped mid-stream");
                        return RelayPhase::Failed;
                    }
                }
                if chunk.finish_reason.is_some() {
                    break;
                }
            }
            Err(e) => {
                warn!(
                    friend_id = %exchange.friend_id,
                    received = buffer.fragments(),
                    error = %e,
                    "Completion stream broke"
                );
                let _ = tx.send(error_event(&ChatError::from(e))).await;
                return RelayPhase::Failed;
            }
        }
    }
    drop(stream);

    let reply = match buffer.finish() {
        Some(reply) => reply,
        None => {
            warn!(friend_id = %exchange.friend_id, "Completion produced no text");
            let err = ChatError::CompletionUnavailable("empty reply".to_string());
            let _ = tx.send(error_event(&err)).await;
            return RelayPhase::Failed;
        }
    };

    if tx.is_closed() {
        debug!(friend_id = %exchange.friend_id, "Receiver dropped before finalizing");
        return RelayPhase::Failed;
    }
    let phase = match phase.transition_to(RelayPhase::Finalizing) {
        Ok(next) => next,
        Err(e) => {
            error!(error = %e, "Relay reached an invalid phase");
            return RelayPhase::Failed;
        }
    };

    match persister.persist(exchange, reply).await {
        Ok(result) => {
            info!(
                message_id = %result.assistant_message.id,
                friend_id = %result.assistant_message.friend_id,
                "Exchange persisted"
            );
            // The exchange is stored even if nobody receives this.
            let _ = tx
                .send(StreamEvent::Final {
                    user_message: result.user_message,
                    assistant_message: result.assistant_message,
                    warning: result.warning,
                })
                .await;
            phase
                .transition_to(RelayPhase::Persisted)
                .unwrap_or(RelayPhase::Persisted)
        }
        Err(e) => {
            let _ = tx.send(error_event(&e)).await;
            RelayPhase::Failed
        }
    }
}

fn error_event(err: &ChatError) -> StreamEvent {
    StreamEvent::Error {
        code: err.code().to_string(),
        message: err.to_string(),
    }
}
