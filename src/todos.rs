//! Ownership-scoped todo operations.
//!
//! Every method takes the caller's [`AuthenticatedUser`] and passes its id to the
//! store alongside any todo id. A todo owned by someone else is reported exactly
//! like one that does not exist.

use std::sync::Arc;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::{
    CreateTodoRequest, ListQuery, TodoListResponse, TodoResponse, TodoStats, UpdateTodoRequest,
};
use crate::store::TodoStore;

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;

/// Highest page honored. Keeps `(page - 1) * per_page` inside `i64` for any
/// allowed page size; anything beyond is past the last row anyway.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PER_PAGE;

/// Normalizes paging input: a page below 1 becomes 1, a page above `MAX_PAGE`
/// becomes `MAX_PAGE`, a page size outside `1..=MAX_PER_PAGE` becomes
/// `DEFAULT_PER_PAGE`.
pub fn page_bounds(query: &ListQuery) -> (i64, i64) {
    let page = query.page.filter(|p| *p >= 1).unwrap_or(1).min(MAX_PAGE);
    let per_page = query
        .per_page
        .filter(|n| (1..=MAX_PER_PAGE).contains(n))
        .unwrap_or(DEFAULT_PER_PAGE);
    (page, per_page)
}

fn total_pages(total: i64, per_page: i64) -> i64 {
    (total + per_page - 1) / per_page
}

pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        caller: &AuthenticatedUser,
        request: CreateTodoRequest,
    ) -> Result<TodoResponse, AppError> {
        request.validate()?;
        let todo = self.store.insert(request.into_new_todo(caller.id)).await?;
        log::debug!("user {} created todo {}", caller.id, todo.id);
        Ok(todo.into())
    }

    pub async fn get(&self, caller: &AuthenticatedUser, id: i64) -> Result<TodoResponse, AppError> {
        self.store
            .find_by_id_and_owner(id, caller.id)
            .await?
            .map(TodoResponse::from)
            .ok_or(AppError::NotFound("Todo"))
    }

    pub async fn list(
        &self,
        caller: &AuthenticatedUser,
        query: &ListQuery,
    ) -> Result<TodoListResponse, AppError> {
        let (page, per_page) = page_bounds(query);
        let (todos, total) = self
            .store
            .list_by_owner(caller.id, page, per_page, query.completed)
            .await?;

        Ok(TodoListResponse {
            todos: todos.into_iter().map(TodoResponse::from).collect(),
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        })
    }

    /// Applies a partial update. The write is conditional on id and owner, so a
    /// todo deleted between the read and the write is still `NotFound`.
    pub async fn update(
        &self,
        caller: &AuthenticatedUser,
        id: i64,
        request: UpdateTodoRequest,
    ) -> Result<TodoResponse, AppError> {
        request.validate()?;

        let mut todo = self
            .store
            .find_by_id_and_owner(id, caller.id)
            .await?
            .ok_or(AppError::NotFound("Todo"))?;
        todo.apply(request);

        self.store
            .update(&todo)
            .await?
            .map(TodoResponse::from)
            .ok_or(AppError::NotFound("Todo"))
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, id: i64) -> Result<(), AppError> {
        if self.store.soft_delete(id, caller.id).await? {
            log::debug!("user {} deleted todo {}", caller.id, id);
            Ok(())
        } else {
            Err(AppError::NotFound("Todo"))
        }
    }

    pub async fn stats(&self, caller: &AuthenticatedUser) -> Result<TodoStats, AppError> {
        let total = self.store.count_by_owner(caller.id).await?;
        let completed = self.store.count_completed_by_owner(caller.id).await?;
        Ok(TodoStats {
            total,
            completed,
            pending: total - completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Patch, TodoPriority};
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn caller(id: i64) -> AuthenticatedUser {
        AuthenticatedUser {
            id,
            email: format!("user{}@example.com", id),
        }
    }

    fn create_request(title: &str) -> CreateTodoRequest {
        CreateTodoRequest {
            title: title.into(),
            description: None,
            priority: None,
            due_date: None,
        }
    }

    fn service() -> TodoService {
        TodoService::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_page_bounds() {
        let query = |page, per_page| ListQuery {
            page,
            per_page,
            completed: None,
        };
        assert_eq!(page_bounds(&query(None, None)), (1, 10));
        assert_eq!(page_bounds(&query(Some(0), Some(0))), (1, 10));
        assert_eq!(page_bounds(&query(Some(-3), Some(101))), (1, 10));
        assert_eq!(page_bounds(&query(Some(4), Some(100))), (4, 100));
        assert_eq!(page_bounds(&query(Some(2), Some(1))), (2, 1));
        assert_eq!(page_bounds(&query(Some(i64::MAX), Some(100))), (MAX_PAGE, 100));
    }

    #[actix_rt::test]
    async fn test_list_far_past_the_end_is_empty() {
        let todos = service();
        let alice = caller(1);
        todos.create(&alice, create_request("only")).await.unwrap();

        for per_page in [Some(10), Some(100), None] {
            let page = todos
                .list(
                    &alice,
                    &ListQuery {
                        page: Some(i64::MAX),
                        per_page,
                        completed: None,
                    },
                )
                .await
                .unwrap();
            assert!(page.todos.is_empty());
            assert_eq!(page.total, 1);
            assert_eq!(page.page, MAX_PAGE);
        }
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[actix_rt::test]
    async fn test_create_assigns_caller_as_owner() {
        let todos = service();
        let created = todos.create(&caller(1), create_request("Buy milk")).await.unwrap();

        assert_eq!(created.user_id, 1);
        assert_eq!(created.priority, TodoPriority::Medium);
        assert!(!created.completed);
        assert_eq!(todos.get(&caller(1), created.id).await.unwrap(), created);
    }

    #[actix_rt::test]
    async fn test_create_validation() {
        let todos = service();
        let result = todos.create(&caller(1), create_request("")).await;
        assert!(matches!(result, Err(AppError::ValidationFailed(_))));
        assert_eq!(todos.stats(&caller(1)).await.unwrap().total, 0);
    }

    #[actix_rt::test]
    async fn test_foreign_todo_is_indistinguishable_from_missing() {
        let todos = service();
        let alice = caller(1);
        let bob = caller(2);
        let created = todos.create(&alice, create_request("private")).await.unwrap();

        let foreign = todos.get(&bob, created.id).await.unwrap_err();
        let missing = todos.get(&bob, 9_999).await.unwrap_err();
        assert_eq!(foreign.to_string(), missing.to_string());

        let update = UpdateTodoRequest {
            title: Patch::Value("hijacked".into()),
            ..Default::default()
        };
        assert!(matches!(
            todos.update(&bob, created.id, update).await,
            Err(AppError::NotFound("Todo"))
        ));
        assert!(matches!(
            todos.delete(&bob, created.id).await,
            Err(AppError::NotFound("Todo"))
        ));

        // Alice's todo is untouched.
        let unchanged = todos.get(&alice, created.id).await.unwrap();
        assert_eq!(unchanged.title, "private");
    }

    #[actix_rt::test]
    async fn test_update_applies_only_present_fields() {
        let todos = service();
        let alice = caller(1);
        let created = todos
            .create(
                &alice,
                CreateTodoRequest {
                    title: "Draft".into(),
                    description: Some("first pass".into()),
                    priority: Some(TodoPriority::High),
                    due_date: None,
                },
            )
            .await
            .unwrap();

        let update: UpdateTodoRequest =
            serde_json::from_str(r#"{"completed": true, "description": null}"#).unwrap();
        let updated = todos.update(&alice, created.id, update).await.unwrap();

        assert!(updated.completed);
        assert_eq!(updated.description, None);
        assert_eq!(updated.title, "Draft");
        assert_eq!(updated.priority, TodoPriority::High);
        assert_eq!(updated.user_id, alice.id);
    }

    #[actix_rt::test]
    async fn test_delete_twice_is_not_found() {
        let todos = service();
        let alice = caller(1);
        let created = todos.create(&alice, create_request("once")).await.unwrap();

        todos.delete(&alice, created.id).await.unwrap();
        assert!(matches!(
            todos.delete(&alice, created.id).await,
            Err(AppError::NotFound("Todo"))
        ));
        assert!(matches!(
            todos.get(&alice, created.id).await,
            Err(AppError::NotFound("Todo"))
        ));
    }

    #[actix_rt::test]
    async fn test_list_and_stats_are_scoped_to_caller() {
        let todos = service();
        let alice = caller(1);
        let bob = caller(2);

        for i in 0..3 {
            todos.create(&alice, create_request(&format!("alice {}", i))).await.unwrap();
        }
        let bobs = todos.create(&bob, create_request("bob 0")).await.unwrap();
        todos
            .update(
                &bob,
                bobs.id,
                UpdateTodoRequest {
                    completed: Patch::Value(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let page = todos
            .list(
                &alice,
                &ListQuery {
                    page: Some(1),
                    per_page: Some(2),
                    completed: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.todos.len(), 2);
        assert_eq!(page.total_pages, 2);
        assert!(page.todos.iter().all(|t| t.user_id == alice.id));

        assert_eq!(
            todos.stats(&alice).await.unwrap(),
            TodoStats {
                total: 3,
                completed: 0,
                pending: 3
            }
        );
        assert_eq!(
            todos.stats(&bob).await.unwrap(),
            TodoStats {
                total: 1,
                completed: 1,
                pending: 0
            }
        );

        let completed_only = todos
            .list(
                &bob,
                &ListQuery {
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(completed_only.total, 1);
        assert_eq!(completed_only.per_page, DEFAULT_PER_PAGE);
    }
}
