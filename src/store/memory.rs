use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{StoreError, TodoStore, UserStore};
use crate::models::{NewTodo, NewUser, Todo, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    todos: BTreeMap<i64, Todo>,
    last_user_id: i64,
    last_todo_id: i64,
}

/// In-process store with the same observable semantics as [`super::PgStore`]:
/// a unique email index, owner-scoped todo operations and soft deletes.
///
/// Each operation takes the lock once and releases it before returning, so no
/// guard is ever held across an `.await`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Database("memory store lock poisoned".into()))
    }

    /// Number of identities stored, for assertions in tests.
    pub fn user_count(&self) -> usize {
        self.lock().map(|t| t.users.len()).unwrap_or(0)
    }
}

fn live_and_owned(todo: &Todo, owner_id: i64) -> bool {
    todo.user_id == owner_id && todo.deleted_at.is_none()
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.lock()?.users.values().any(|u| u.email == email))
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.lock()?;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("email"));
        }

        tables.last_user_id += 1;
        let now = Utc::now();
        let stored = User {
            id: tables.last_user_id,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let mut tables = self.lock()?;
        tables.last_todo_id += 1;
        let now = Utc::now();
        let stored = Todo {
            id: tables.last_todo_id,
            user_id: todo.user_id,
            title: todo.title,
            description: todo.description,
            completed: false,
            priority: todo.priority,
            due_date: todo.due_date,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.todos.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id_and_owner(
        &self,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<Todo>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .todos
            .get(&id)
            .filter(|t| live_and_owned(t, owner_id))
            .cloned())
    }

    async fn update(&self, todo: &Todo) -> Result<Option<Todo>, StoreError> {
        let mut tables = self.lock()?;
        match tables.todos.get_mut(&todo.id) {
            Some(stored) if live_and_owned(stored, todo.user_id) => {
                stored.title = todo.title.clone();
                stored.description = todo.description.clone();
                stored.completed = todo.completed;
                stored.priority = todo.priority;
                stored.due_date = todo.due_date;
                stored.updated_at = Utc::now();
                Ok(Some(stored.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn soft_delete(&self, id: i64, owner_id: i64) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        match tables.todos.get_mut(&id) {
            Some(stored) if live_and_owned(stored, owner_id) => {
                stored.deleted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count_by_owner(&self, owner_id: i64) -> Result<i64, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .todos
            .values()
            .filter(|t| live_and_owned(t, owner_id))
            .count() as i64)
    }

    async fn count_completed_by_owner(&self, owner_id: i64) -> Result<i64, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .todos
            .values()
            .filter(|t| live_and_owned(t, owner_id) && t.completed)
            .count() as i64)
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        page: i64,
        per_page: i64,
        completed: Option<bool>,
    ) -> Result<(Vec<Todo>, i64), StoreError> {
        let tables = self.lock()?;
        let mut matching: Vec<&Todo> = tables
            .todos
            .values()
            .filter(|t| live_and_owned(t, owner_id))
            .filter(|t| completed.map_or(true, |c| t.completed == c))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let offset = (page - 1).saturating_mul(per_page).max(0) as usize;
        let todos = matching
            .into_iter()
            .skip(offset)
            .take(per_page.max(0) as usize)
            .cloned()
            .collect();

        Ok((todos, total))
    }
}
