use std::sync::Arc;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::error::{AppError, ValidationReason};
use crate::models::todo::parse_due_date;
use crate::models::{CreateTodoRequest, Todo, TodoDraft, TodoPriority, UpdateTodoRequest};
use crate::repository::{RepositoryError, TodoRepository};

/// Todo CRUD for the authenticated caller. Other users' todos are invisible.
pub struct TodoService {
    todos: Arc<dyn TodoRepository>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn todo_error(error: RepositoryError) -> AppError {
    match error {
        RepositoryError::NotFound => AppError::NotFound("Todo not found".into()),
        other => other.into(),
    }
}

fn check_id(id: u64) -> Result<(), AppError> {
    if id == 0 {
        return Err(AppError::Validation(ValidationReason::InvalidId));
    }
    Ok(())
}

fn build_draft(
    title: String,
    description: Option<String>,
    priority: Option<TodoPriority>,
    category: Option<String>,
    due_date: Option<String>,
    completed: bool,
) -> Result<TodoDraft, AppError> {
    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::Validation(ValidationReason::Invalid(
            "title must not be blank".into(),
        )));
    }

    Ok(TodoDraft {
        title,
        description: trimmed(description),
        priority,
        category: trimmed(category),
        due_date: parse_due_date(due_date.as_deref()),
        completed,
    })
}

impl TodoService {
    pub fn new(todos: Arc<dyn TodoRepository>) -> Self {
        Self { todos }
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        request: CreateTodoRequest,
    ) -> Result<Todo, AppError> {
        request.validate()?;
        let draft = build_draft(
            request.title,
            request.description,
            request.priority,
            request.category,
            request.due_date,
            false,
        )?;

        let todo = self
            .todos
            .create(user.user_id, draft)
            .await
            .map_err(todo_error)?;
        log::info!("User {} created todo {}", user.user_id, todo.id);
        Ok(todo)
    }

    pub async fn list(&self, user: &AuthenticatedUser) -> Result<Vec<Todo>, AppError> {
        self.todos
            .list_by_user(user.user_id)
            .await
            .map_err(todo_error)
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: u64) -> Result<Todo, AppError> {
        check_id(id)?;
        self.todos.get(user.user_id, id).await.map_err(todo_error)
    }

    /// Replaces every editable field. `created_at` is kept.
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: u64,
        request: UpdateTodoRequest,
    ) -> Result<Todo, AppError> {
        check_id(id)?;
        request.validate()?;
        let draft = build_draft(
            request.title,
            request.description,
            request.priority,
            request.category,
            request.due_date,
            request.completed,
        )?;

        self.todos
            .update(user.user_id, id, draft)
            .await
            .map_err(todo_error)
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: u64) -> Result<(), AppError> {
        check_id(id)?;
        self.todos.delete(user.user_id, id).await.map_err(todo_error)?;
        log::info!("User {} deleted todo {}", user.user_id, id);
        Ok(())
    }
}
