use async_trait::async_trait;
use sqlx::PgPool;

use super::{StoreError, TodoStore, UserStore};
use crate::models::{NewTodo, NewUser, Todo, User};

const USER_COLUMNS: &str = "id, email, password_hash, created_at, updated_at";
const TODO_COLUMNS: &str = "id, user_id, title, description, completed, priority, due_date, \
                            created_at, updated_at, deleted_at";

/// PostgreSQL-backed store. Cloning is cheap: the pool is reference counted.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the schema in `migrations/`.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists.0)
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        );
        // A concurrent registration that slipped past the pre-check fails here
        // on users_email_key and surfaces as UniqueViolation.
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let sql = format!(
            "INSERT INTO todos (user_id, title, description, priority, due_date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            TODO_COLUMNS
        );
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(todo.user_id)
            .bind(todo.title)
            .bind(todo.description)
            .bind(todo.priority)
            .bind(todo.due_date)
            .fetch_one(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn find_by_id_and_owner(
        &self,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<Todo>, StoreError> {
        let sql = format!(
            "SELECT {} FROM todos WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
            TODO_COLUMNS
        );
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn update(&self, todo: &Todo) -> Result<Option<Todo>, StoreError> {
        let sql = format!(
            "UPDATE todos \
             SET title = $1, description = $2, completed = $3, priority = $4, due_date = $5, \
                 updated_at = NOW() \
             WHERE id = $6 AND user_id = $7 AND deleted_at IS NULL \
             RETURNING {}",
            TODO_COLUMNS
        );
        let updated = sqlx::query_as::<_, Todo>(&sql)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.completed)
            .bind(todo.priority)
            .bind(todo.due_date)
            .bind(todo.id)
            .bind(todo.user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn soft_delete(&self, id: i64, owner_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE todos SET deleted_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by_owner(&self, owner_id: i64) -> Result<i64, StoreError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM todos WHERE user_id = $1 AND deleted_at IS NULL")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0)
    }

    async fn count_completed_by_owner(&self, owner_id: i64) -> Result<i64, StoreError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM todos \
             WHERE user_id = $1 AND completed = TRUE AND deleted_at IS NULL",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        page: i64,
        per_page: i64,
        completed: Option<bool>,
    ) -> Result<(Vec<Todo>, i64), StoreError> {
        // `$2::BOOLEAN IS NULL` keeps one statement for both the filtered and unfiltered case.
        let filter = "user_id = $1 AND deleted_at IS NULL AND ($2::BOOLEAN IS NULL OR completed = $2)";

        let total: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM todos WHERE {}", filter))
            .bind(owner_id)
            .bind(completed)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {} FROM todos WHERE {} ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4",
            TODO_COLUMNS, filter
        );
        let todos = sqlx::query_as::<_, Todo>(&sql)
            .bind(owner_id)
            .bind(completed)
            .bind(per_page)
            .bind((page - 1).saturating_mul(per_page))
            .fetch_all(&self.pool)
            .await?;

        Ok((todos, total.0))
    }
}
