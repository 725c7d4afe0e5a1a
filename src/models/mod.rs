pub mod todo;
pub mod user;

pub use todo::{CreateTodoRequest, Todo, TodoDraft, TodoPriority, UpdateTodoRequest};
pub use user::{NewUser, User};
