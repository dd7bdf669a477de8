use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError, ValidationErrors};

use super::patch::Patch;

pub const TITLE_MAX_LEN: usize = 255;
pub const DESCRIPTION_MAX_LEN: usize = 1000;

/// Represents the priority of a todo.
/// Corresponds to the `todo_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// A todo as stored. `user_id` is fixed at creation and never changes.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: TodoPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker. Rows with this set are invisible to every store query.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Todo {
    /// Applies a validated partial update in place.
    pub fn apply(&mut self, update: UpdateTodoRequest) {
        update.title.apply(&mut self.title);
        update.description.apply_nullable(&mut self.description);
        update.completed.apply(&mut self.completed);
        update.priority.apply(&mut self.priority);
        update.due_date.apply_nullable(&mut self.due_date);
    }
}

/// Everything the store needs to insert a todo. The owner comes from the
/// authenticated identity, never from the request body.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: TodoPriority,
    pub due_date: Option<DateTime<Utc>>,
}

/// Request body for creating a todo.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTodoRequest {
    /// Must be between 1 and 255 characters.
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    /// At most 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Defaults to `medium` when omitted.
    pub priority: Option<TodoPriority>,
    pub due_date: Option<DateTime<Utc>>,
}

impl CreateTodoRequest {
    pub fn into_new_todo(self, user_id: i64) -> NewTodo {
        NewTodo {
            user_id,
            title: self.title,
            description: self.description,
            priority: self.priority.unwrap_or_default(),
            due_date: self.due_date,
        }
    }
}

/// Request body for a partial update. Every field is optional; `description`
/// and `due_date` may also be cleared with an explicit `null`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub completed: Patch<bool>,
    #[serde(default)]
    pub priority: Patch<TodoPriority>,
    #[serde(default)]
    pub due_date: Patch<DateTime<Utc>>,
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

impl Validate for UpdateTodoRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.title.is_null() {
            errors.add("title", field_error("null", "title cannot be null"));
        }
        if let Some(title) = self.title.as_value() {
            let len = title.chars().count();
            if len == 0 || len > TITLE_MAX_LEN {
                errors.add("title", field_error("length", "title must be 1 to 255 characters"));
            }
        }
        if let Some(description) = self.description.as_value() {
            if description.chars().count() > DESCRIPTION_MAX_LEN {
                errors.add(
                    "description",
                    field_error("length", "description must be at most 1000 characters"),
                );
            }
        }
        if self.completed.is_null() {
            errors.add("completed", field_error("null", "completed cannot be null"));
        }
        if self.priority.is_null() {
            errors.add("priority", field_error("null", "priority cannot be null"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Query parameters for listing todos.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub completed: Option<bool>,
}

/// A todo as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoResponse {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: TodoPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            user_id: todo.user_id,
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            priority: todo.priority,
            due_date: todo.due_date,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

/// One page of the caller's todos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoListResponse {
    pub todos: Vec<TodoResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoStats {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
}
