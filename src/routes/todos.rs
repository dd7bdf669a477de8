use actix_web::{delete, get, post, put, web, Responder};

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::{CreateTodoRequest, ListQuery, UpdateTodoRequest};
use crate::response;
use crate::todos::TodoService;

/// Creates a todo owned by the caller.
///
/// ## Responses:
/// - `201 Created`: the new todo.
/// - `400 Bad Request`: the body is not valid JSON for a `CreateTodoRequest`.
/// - `422 Unprocessable Entity`: title or description out of bounds.
#[post("")]
pub async fn create_todo(
    todos: web::Data<TodoService>,
    user: AuthenticatedUser,
    todo_data: web::Json<CreateTodoRequest>,
) -> Result<impl Responder, AppError> {
    let todo = todos.create(&user, todo_data.into_inner()).await?;
    Ok(response::created("Todo created successfully", todo))
}

/// Lists the caller's todos, newest first.
///
/// ## Query Parameters:
/// - `page` (optional, default 1)
/// - `per_page` (optional, default 10, at most 100)
/// - `completed` (optional): filter by completion state.
#[get("")]
pub async fn list_todos(
    todos: web::Data<TodoService>,
    user: AuthenticatedUser,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, AppError> {
    let page = todos.list(&user, &query).await?;
    Ok(response::ok("Todos retrieved successfully", page))
}

#[get("/stats")]
pub async fn todo_stats(
    todos: web::Data<TodoService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let stats = todos.stats(&user).await?;
    Ok(response::ok("Statistics retrieved successfully", stats))
}

/// `404` both for an unknown id and for a todo owned by someone else.
#[get("/{id}")]
pub async fn get_todo(
    todos: web::Data<TodoService>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let todo = todos.get(&user, path.into_inner()).await?;
    Ok(response::ok("Todo retrieved successfully", todo))
}

/// Partial update. Omitted fields are left unchanged; `description` and
/// `due_date` may be cleared with `null`.
#[put("/{id}")]
pub async fn update_todo(
    todos: web::Data<TodoService>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    todo_data: web::Json<UpdateTodoRequest>,
) -> Result<impl Responder, AppError> {
    let todo = todos
        .update(&user, path.into_inner(), todo_data.into_inner())
        .await?;
    Ok(response::ok("Todo updated successfully", todo))
}

#[delete("/{id}")]
pub async fn delete_todo(
    todos: web::Data<TodoService>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    todos.delete(&user, path.into_inner()).await?;
    Ok(response::no_content())
}
