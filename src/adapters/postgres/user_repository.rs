//! PostgreSQL implementation of UserRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{corrupt_row, db_error};
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::friend::Gender;
use crate::domain::quota::{DailyQuota, SubscriptionTier};
use crate::domain::user::UserAccount;
use crate::ports::{RepositoryError, UserRepository};

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    name: Option<String>,
    gender: Option<String>,
    tier: String,
    messages_used_today: i32,
    quota_reset_at: DateTime<Utc>,
    default_friends_seeded: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(UserAccount {
            id: UserId::new(row.id).map_err(corrupt_row("users.id"))?,
            name: row.name,
            gender: row
                .gender
                .as_deref()
                .map(str::parse::<Gender>)
                .transpose()
                .map_err(corrupt_row("users.gender"))?,
            tier: row
                .tier
                .parse::<SubscriptionTier>()
                .map_err(corrupt_row("users.tier"))?,
            quota: DailyQuota {
                messages_used_today: row.messages_used_today.max(0) as u32,
                reset_at: Timestamp::from_datetime(row.quota_reset_at),
            },
            default_friends_seeded: row.default_friends_seeded,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, gender, tier, messages_used_today, quota_reset_at,
                   default_friends_seeded, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load user"))?;

        row.map(UserAccount::try_from).transpose()
    }

    async fn create(&self, user: &UserAccount) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, gender, tier, messages_used_today, quota_reset_at,
                default_friends_seeded, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.name)
        .bind(user.gender.as_ref().map(Gender::as_str))
        .bind(user.tier.as_str())
        .bind(user.quota.messages_used_today as i32)
        .bind(user.quota.reset_at.as_datetime())
        .bind(user.default_friends_seeded)
        .bind(user.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to create user"))?;

        Ok(())
    }

    async fn save_quota(&self, id: &UserId, quota: DailyQuota) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET messages_used_today = $2, quota_reset_at = $3 WHERE id = $1",
        )
        .bind(id.as_str())
        .bind(quota.messages_used_today as i32)
        .bind(quota.reset_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save quota"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("user {}", id)));
        }
        Ok(())
    }

    async fn increment_messages_used(&self, id: &UserId) -> Result<(), RepositoryError> {
        // Single statement so concurrent sends never lose an increment.
        let result = sqlx::query(
            "UPDATE users SET messages_used_today = messages_used_today + 1 WHERE id = $1",
        )
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to increment message count"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("user {}", id)));
        }
        Ok(())
    }
}
