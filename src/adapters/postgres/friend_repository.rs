//! PostgreSQL implementation of FriendRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::{corrupt_row, db_error};
use crate::domain::foundation::{FriendId, Timestamp, UserId};
use crate::domain::friend::{Friend, Gender};
use crate::ports::{FriendRepository, FriendSummary, RepositoryError};

pub struct PostgresFriendRepository {
    pool: PgPool,
}

impl PostgresFriendRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a friend.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct FriendRow {
    id: Uuid,
    user_id: String,
    name: String,
    personality: String,
    age: Option<i16>,
    gender: Option<String>,
    traits: Vec<String>,
    voice: Option<String>,
    background: Option<String>,
    interests: Vec<String>,
    avatar: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct FriendWithCountRow {
    #[sqlx(flatten)]
    friend: FriendRow,
    message_count: i64,
}

impl TryFrom<FriendRow> for Friend {
    type Error = RepositoryError;

    fn try_from(row: FriendRow) -> Result<Self, Self::Error> {
        let gender = row
            .gender
            .as_deref()
            .map(str::parse::<Gender>)
            .transpose()
            .map_err(corrupt_row("friends.gender"))?;

        Ok(Friend {
            id: FriendId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(corrupt_row("friends.user_id"))?,
            name: row.name,
            personality: row.personality,
            age: row.age.and_then(|a| u16::try_from(a).ok()),
            gender,
            traits: row.traits,
            voice: row.voice,
            background: row.background,
            interests: row.interests,
            avatar: row.avatar,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const FRIEND_COLUMNS: &str = "f.id, f.user_id, f.name, f.personality, f.age, f.gender, \
     f.traits, f.voice, f.background, f.interests, f.avatar, f.created_at, f.updated_at";

/// Inserts a friend row. Shared with the unit of work.
pub(super) async fn insert_friend<'e, E: PgExecutor<'e>>(
    executor: E,
    friend: &Friend,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO friends (
            id, user_id, name, personality, age, gender, traits, voice,
            background, interests, avatar, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(friend.id.as_uuid())
    .bind(friend.user_id.as_str())
    .bind(&friend.name)
    .bind(&friend.personality)
    .bind(friend.age.map(|a| a as i16))
    .bind(friend.gender.as_ref().map(Gender::as_str))
    .bind(&friend.traits)
    .bind(&friend.voice)
    .bind(&friend.background)
    .bind(&friend.interests)
    .bind(&friend.avatar)
    .bind(friend.created_at.as_datetime())
    .bind(friend.updated_at.as_datetime())
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl FriendRepository for PostgresFriendRepository {
    async fn find_by_id(&self, id: &FriendId) -> Result<Option<Friend>, RepositoryError> {
        let row: Option<FriendRow> =
            sqlx::query_as(&format!("SELECT {} FROM friends f WHERE f.id = $1", FRIEND_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to load friend"))?;

        row.map(Friend::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<FriendSummary>, RepositoryError> {
        let rows: Vec<FriendWithCountRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}, COUNT(m.id) AS message_count
            FROM friends f
            LEFT JOIN messages m ON m.friend_id = f.id AND m.role <> 'system'
            WHERE f.user_id = $1
            GROUP BY f.id
            ORDER BY f.updated_at DESC, f.id DESC
            "#,
            FRIEND_COLUMNS
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list friends"))?;

        rows.into_iter()
            .map(|row| {
                Ok(FriendSummary {
                    message_count: row.message_count.max(0) as u64,
                    friend: Friend::try_from(row.friend)?,
                })
            })
            .collect()
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<u32, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM friends WHERE user_id = $1")
            .bind(user_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count friends"))?;

        Ok(count.max(0) as u32)
    }

    async fn create(&self, friend: &Friend) -> Result<(), RepositoryError> {
        insert_friend(&self.pool, friend)
            .await
            .map_err(db_error("Failed to create friend"))
    }

    async fn delete(&self, id: &FriendId) -> Result<(), RepositoryError> {
        // messages.friend_id is ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM friends WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete friend"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("friend {}", id)));
        }
        Ok(())
    }

    async fn touch(&self, id: &FriendId, at: Timestamp) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE friends SET updated_at = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(at.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to touch friend"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("friend {}", id)));
        }
        Ok(())
    }
}
