//! Storage collaborators for users and todos.
//!
//! Services depend on the `UserRepository` and `TodoRepository` traits only. The
//! Postgres implementations back the running server; the in-memory ones back the
//! test-suite and local runs without a database.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewUser, Todo, TodoDraft, User};

pub use memory::{InMemoryTodoRepository, InMemoryUserRepository};
pub use postgres::{PgTodoRepository, PgUserRepository};

/// Failures reported by a storage collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new user. Unique-email enforcement belongs to the storage layer.
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Exact, case-sensitive lookup.
    async fn get_user_by_email(&self, email: &str) -> Result<User, RepositoryError>;

    async fn get_user_by_id(&self, id: u64) -> Result<User, RepositoryError>;

    /// Reachability check used by the health endpoint.
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Todo storage. Every read and write is scoped to the owning user.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    async fn create(&self, user_id: u64, draft: TodoDraft) -> Result<Todo, RepositoryError>;

    /// Newest first.
    async fn list_by_user(&self, user_id: u64) -> Result<Vec<Todo>, RepositoryError>;

    async fn get(&self, user_id: u64, id: u64) -> Result<Todo, RepositoryError>;

    async fn update(&self, user_id: u64, id: u64, draft: TodoDraft)
        -> Result<Todo, RepositoryError>;

    async fn delete(&self, user_id: u64, id: u64) -> Result<(), RepositoryError>;
}
