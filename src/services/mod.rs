//! Request orchestration between the HTTP handlers and the repositories.

pub mod auth;
pub mod todos;

pub use auth::AuthService;
pub use todos::TodoService;
