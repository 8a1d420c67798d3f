//! PostgreSQL implementation of MessageRepository.
//!
//! Conversation order is `(created_at, id)`, backed by the
//! `messages_friend_created_id_idx` index.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::{corrupt_row, db_error};
use crate::domain::conversation::{Message, MessagePage, MessageRole, PageRequest};
use crate::domain::foundation::{FriendId, MessageId, Timestamp, UserId};
use crate::ports::{MessageRepository, RepositoryError};

pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    friend_id: Uuid,
    user_id: String,
    role: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = RepositoryError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Message {
            id: MessageId::from_uuid(row.id),
            friend_id: FriendId::from_uuid(row.friend_id),
            user_id: UserId::new(row.user_id).map_err(corrupt_row("messages.user_id"))?,
            role: row
                .role
                .parse::<MessageRole>()
                .map_err(corrupt_row("messages.role"))?,
            content: row.content,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn into_messages(rows: Vec<MessageRow>) -> Result<Vec<Message>, RepositoryError> {
    rows.into_iter().map(Message::try_from).collect()
}

/// Inserts a message row. Shared with the unit of work.
pub(super) async fn insert_message<'e, E: PgExecutor<'e>>(
    executor: E,
    message: &Message,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO messages (id, friend_id, user_id, role, content, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(message.id.as_uuid())
    .bind(message.friend_id.as_uuid())
    .bind(message.user_id.as_str())
    .bind(message.role.as_str())
    .bind(&message.content)
    .bind(message.created_at.as_datetime())
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn find_by_id(&self, id: &MessageId) -> Result<Option<Message>, RepositoryError> {
        let row: Option<MessageRow> = sqlx::query_as(
            "SELECT id, friend_id, user_id, role, content, created_at FROM messages WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load message"))?;

        row.map(Message::try_from).transpose()
    }

    async fn recent_for_friend(
        &self,
        friend_id: &FriendId,
        limit: u32,
    ) -> Result<Vec<Message>, RepositoryError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            r#"
            SELECT * FROM (
                SELECT id, friend_id, user_id, role, content, created_at
                FROM messages
                WHERE friend_id = $1 AND role <> 'system'
                ORDER BY created_at DESC, id DESC
                LIMIT $2
            ) recent
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(friend_id.as_uuid())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load recent messages"))?;

        into_messages(rows)
    }

    async fn find_preceding_user_message(
        &self,
        friend_id: &FriendId,
        before: Timestamp,
    ) -> Result<Option<Message>, RepositoryError> {
        let row: Option<MessageRow> = sqlx::query_as(
            r#"
            SELECT id, friend_id, user_id, role, content, created_at
            FROM messages
            WHERE friend_id = $1 AND role = 'user' AND created_at < $2
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(friend_id.as_uuid())
        .bind(before.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find preceding user message"))?;

        row.map(Message::try_from).transpose()
    }

    async fn page_for_friend(
        &self,
        friend_id: &FriendId,
        page: PageRequest,
    ) -> Result<MessagePage, RepositoryError> {
        let (before_at, before_id) = match page.before {
            Some(cursor) => (
                Some(*cursor.created_at.as_datetime()),
                Some(*cursor.id.as_uuid()),
            ),
            None => (None, None),
        };

        let rows: Vec<MessageRow> = sqlx::query_as(
            r#"
            SELECT id, friend_id, user_id, role, content, created_at
            FROM messages
            WHERE friend_id = $1
              AND role <> 'system'
              AND ($2::timestamptz IS NULL OR (created_at, id) < ($2, $3::uuid))
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            "#,
        )
        .bind(friend_id.as_uuid())
        .bind(before_at)
        .bind(before_id)
        .bind(i64::from(page.limit) + 1)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load message page"))?;

        Ok(MessagePage::from_newest_first(into_messages(rows)?, page.limit))
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE user_id = $1 AND role <> 'system'",
        )
        .bind(user_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count messages"))?;

        Ok(count.max(0) as u64)
    }
}
