pub mod patch;
pub mod todo;
pub mod user;

pub use patch::Patch;
pub use todo::{
    CreateTodoRequest, ListQuery, NewTodo, Todo, TodoListResponse, TodoPriority, TodoResponse,
    TodoStats, UpdateTodoRequest,
};
pub use user::{normalize_email, NewUser, User, UserResponse};
