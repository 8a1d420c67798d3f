//! HTTP transport for the chat service.
//!
//! Speaks the `/messages/stream` SSE endpoint and the rollback endpoint.

use async_trait::async_trait;
use futures::{stream, Stream, StreamExt};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use super::{ChatTransport, ClientError, EventStream};
use crate::adapters::sse::{SseEvent, SseLineBuffer};
use crate::domain::conversation::StreamEvent;
use crate::domain::foundation::{FriendId, MessageId};

pub struct HttpChatTransport {
    client: Client,
    base_url: String,
    token: Secret<String>,
}

impl HttpChatTransport {
    pub fn new(base_url: impl Into<String>, token: Secret<String>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ClientError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(self.token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(server_error(response).await)
        }
    }
}

#[derive(Serialize)]
struct SendBody<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct RollbackBody {
    deleted_ids: Vec<MessageId>,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

async fn server_error(response: Response) -> ClientError {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => ClientError::Server {
            code: body.code,
            message: body.message,
        },
        Err(_) => ClientError::Transport(format!("Unexpected status {}", status)),
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, friend_id: &FriendId, content: &str) -> Result<EventStream, ClientError> {
        let path = format!("/api/friends/{}/messages/stream", friend_id);
        let response = self.post(&path, &SendBody { content }).await?;
        Ok(event_stream(response.bytes_stream()))
    }

    async fn rollback(&self, message_id: &MessageId) -> Result<Vec<MessageId>, ClientError> {
        let path = format!("/api/messages/{}/rollback", message_id);
        let response = self.post(&path, &serde_json::json!({})).await?;
        let body: RollbackBody = response
            .json()
            .await
            .map_err(|e| ClientError::Protocol(e.to_string()))?;
        Ok(body.deleted_ids)
    }
}

type ByteStream<B, E> = Pin<Box<dyn Stream<Item = Result<B, E>> + Send>>;

struct EventState<B, E> {
    bytes: ByteStream<B, E>,
    lines: SseLineBuffer,
    pending: VecDeque<Result<StreamEvent, ClientError>>,
    done: bool,
}

impl<B, E> EventState<B, E> {
    fn absorb(&mut self, events: Vec<SseEvent>) {
        for event in events {
            let parsed = match event {
                SseEvent::Data(data) => serde_json::from_str::<StreamEvent>(&data)
                    .map_err(|e| ClientError::Protocol(format!("Bad event payload: {}", e))),
                SseEvent::Malformed(reason) => Err(ClientError::Protocol(reason)),
                SseEvent::Done => continue,
            };
            let stop = parsed.as_ref().map_or(true, StreamEvent::is_terminal);
            self.pending.push_back(parsed);
            if stop {
                self.done = true;
                return;
            }
        }
    }
}

/// Parses the service's SSE body into stream events.
///
/// Ends after the first terminal event or payload that fails to parse.
pub(crate) fn event_stream<S, B, E>(bytes: S) -> EventStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let state = EventState {
        bytes: Box::pin(bytes),
        lines: SseLineBuffer::new(),
        pending: VecDeque::new(),
        done: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.done {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = state.lines.feed(chunk.as_ref());
                    state.absorb(events);
                }
                Some(Err(e)) => {
                    state
                        .pending
                        .push_back(Err(ClientError::Transport(e.to_string())));
                    state.done = true;
                }
                None => {
                    let events = state.lines.flush();
                    state.absorb(events);
                    state.done = true;
                }
            }
        }
    }))
}
