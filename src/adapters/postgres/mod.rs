//! PostgreSQL adapters - Database implementations for the storage ports.
//!
//! - `PostgresFriendRepository` - friends with per-friend message counts
//! - `PostgresMessageRepository` - conversation reads and keyset pages
//! - `PostgresUserRepository` - accounts and the daily counter
//! - `PostgresUnitOfWork` - multi-row writes inside one transaction
//!
//! Schema lives in `migrations/`.

mod friend_repository;
mod message_repository;
mod unit_of_work;
mod user_repository;

pub use friend_repository::PostgresFriendRepository;
pub use message_repository::PostgresMessageRepository;
pub use unit_of_work::PostgresUnitOfWork;
pub use user_repository::PostgresUserRepository;

use crate::ports::RepositoryError;

/// Maps a sqlx error, turning unique violations into `Conflict`.
fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> RepositoryError {
    move |e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return RepositoryError::Conflict(format!("{}: {}", context, db_err.message()));
            }
        }
        RepositoryError::database(format!("{}: {}", context, e))
    }
}

/// Maps a stored value that no longer parses into a domain type.
fn corrupt_row(context: &'static str) -> impl Fn(crate::domain::foundation::ValidationError) -> RepositoryError {
    move |e| RepositoryError::database(format!("{}: {}", context, e))
}
