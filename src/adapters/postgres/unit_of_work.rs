//! PostgreSQL implementation of UnitOfWork.
//!
//! Every operation runs inside one transaction; the first failure rolls the
//! whole batch back.

use async_trait::async_trait;
use sqlx::PgPool;

use super::db_error;
use super::friend_repository::insert_friend;
use super::message_repository::insert_message;
use crate::ports::{RepositoryError, StoreOperation, UnitOfWork};

pub struct PostgresUnitOfWork {
    pool: PgPool,
}

impl PostgresUnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn commit(&self, operations: Vec<StoreOperation>) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        for operation in operations {
            match operation {
                StoreOperation::CreateFriend(friend) => {
                    insert_friend(&mut *tx, &friend)
                        .await
                        .map_err(db_error("Failed to create friend"))?;
                }
                StoreOperation::CreateMessage(message) => {
                    insert_message(&mut *tx, &message)
                        .await
                        .map_err(db_error("Failed to create message"))?;
                }
                StoreOperation::DeleteMessage(id) => {
                    let result = sqlx::query("DELETE FROM messages WHERE id = $1")
                        .bind(id.as_uuid())
                        .execute(&mut *tx)
                        .await
                        .map_err(db_error("Failed to delete message"))?;
                    if result.rows_affected() == 0 {
                        // Dropping `tx` rolls back.
                        return Err(RepositoryError::NotFound(format!("message {}", id)));
                    }
                }
                StoreOperation::MarkDefaultFriendsSeeded(user_id) => {
                    // Row lock serialises concurrent seeds; the loser sees the flag set.
                    let result = sqlx::query(
                        "UPDATE users SET default_friends_seeded = TRUE \
                         WHERE id = $1 AND NOT default_friends_seeded",
                    )
                    .bind(user_id.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error("Failed to mark default friends seeded"))?;
                    if result.rows_affected() == 0 {
                        return Err(RepositoryError::Conflict(format!(
                            "user {} missing or already seeded",
                            user_id
                        )));
                    }
                }
            }
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))
    }
}
