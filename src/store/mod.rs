//! Persistence collaborators.
//!
//! Services depend on the [`UserStore`] and [`TodoStore`] traits and receive a
//! concrete implementation at construction time. [`PgStore`] is the production
//! backend; [`MemoryStore`] backs the test suite.
//!
//! Every todo operation that addresses a single row takes the owner id as well,
//! and matches on both in one statement.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt;

use crate::models::{NewTodo, NewUser, Todo, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug)]
pub enum StoreError {
    /// A unique index rejected the write. Carries the indexed column.
    UniqueViolation(&'static str),
    Database(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::UniqueViolation(column) => write!(f, "unique violation on {}", column),
            StoreError::Database(msg) => write!(f, "database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        if let Some(db_err) = error.as_database_error() {
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation("email");
            }
        }
        StoreError::Database(error.to_string())
    }
}

/// Credential store: identities looked up by email or id.
///
/// The unique index on email is authoritative. `insert` must report a
/// duplicate as `StoreError::UniqueViolation` even if a caller's
/// `exists_by_email` pre-check passed moments earlier.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError>;

    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
}

/// Owned-resource store for todos.
#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError>;

    /// The todo with this id *and* this owner, if it exists and is not deleted.
    async fn find_by_id_and_owner(&self, id: i64, owner_id: i64)
        -> Result<Option<Todo>, StoreError>;

    /// Writes the mutable fields of `todo`, matching on `todo.id` and
    /// `todo.user_id`. Returns `None` when no live row matched.
    async fn update(&self, todo: &Todo) -> Result<Option<Todo>, StoreError>;

    /// Marks the todo deleted if, and only if, it is live and owned by
    /// `owner_id`. Returns whether a row was affected.
    async fn soft_delete(&self, id: i64, owner_id: i64) -> Result<bool, StoreError>;

    async fn count_by_owner(&self, owner_id: i64) -> Result<i64, StoreError>;

    async fn count_completed_by_owner(&self, owner_id: i64) -> Result<i64, StoreError>;

    /// One page of the owner's todos, newest first, with the total matching the
    /// filter. `page` and `per_page` are already normalized.
    async fn list_by_owner(
        &self,
        owner_id: i64,
        page: i64,
        per_page: i64,
        completed: Option<bool>,
    ) -> Result<(Vec<Todo>, i64), StoreError>;
}
