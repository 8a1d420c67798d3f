//! Scripted transport for tests.

use async_trait::async_trait;
use futures::stream;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{ChatTransport, ClientError, EventStream};
use crate::domain::conversation::StreamEvent;
use crate::domain::foundation::{FriendId, MessageId};

enum ScriptedSend {
    Events(Vec<Result<StreamEvent, ClientError>>),
    Refuse(ClientError),
}

/// Transport that replays queued responses in order.
#[derive(Clone, Default)]
pub struct MockChatTransport {
    sends: Arc<Mutex<VecDeque<ScriptedSend>>>,
    rollbacks: Arc<Mutex<VecDeque<Result<Vec<MessageId>, ClientError>>>>,
    sent: Arc<Mutex<Vec<(FriendId, String)>>>,
}

impl MockChatTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a send that yields these events.
    pub fn with_events(self, events: Vec<StreamEvent>) -> Self {
        self.push_send(ScriptedSend::Events(events.into_iter().map(Ok).collect()))
    }

    /// Queues a send whose stream breaks after `events`.
    pub fn with_broken_stream(self, events: Vec<StreamEvent>, error: ClientError) -> Self {
        let mut items: Vec<_> = events.into_iter().map(Ok).collect();
        items.push(Err(error));
        self.push_send(ScriptedSend::Events(items))
    }

    /// Queues a send that fails to open.
    pub fn with_send_error(self, error: ClientError) -> Self {
        self.push_send(ScriptedSend::Refuse(error))
    }

    pub fn with_rollback(self, result: Result<Vec<MessageId>, ClientError>) -> Self {
        if let Ok(mut queue) = self.rollbacks.lock() {
            queue.push_back(result);
        }
        self
    }

    /// Every `(friend, content)` passed to `send`.
    pub fn sent(&self) -> Vec<(FriendId, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn push_send(self, send: ScriptedSend) -> Self {
        if let Ok(mut queue) = self.sends.lock() {
            queue.push_back(send);
        }
        self
    }
}

#[async_trait]
impl ChatTransport for MockChatTransport {
    async fn send(&self, friend_id: &FriendId, content: &str) -> Result<EventStream, ClientError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((*friend_id, content.to_string()));
        }
        let next = self.sends.lock().ok().and_then(|mut q| q.pop_front());
        match next {
            Some(ScriptedSend::Events(items)) => Ok(Box::pin(stream::iter(items))),
            Some(ScriptedSend::Refuse(error)) => Err(error),
            None => Err(ClientError::Transport("no scripted response".to_string())),
        }
    }

    async fn rollback(&self, _message_id: &MessageId) -> Result<Vec<MessageId>, ClientError> {
        self.rollbacks
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| Err(ClientError::Transport("no scripted response".to_string())))
    }
}
