use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{RepositoryError, TodoRepository, UserRepository};
use crate::models::{NewUser, Todo, TodoDraft, TodoPriority, User};

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, created_at, updated_at";
const TODO_COLUMNS: &str =
    "id, user_id, title, description, priority, category, due_date, completed, created_at, updated_at";

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
                RepositoryError::DuplicateEmail
            }
            _ => RepositoryError::Storage(error.to_string()),
        }
    }
}

// Identifiers are BIGSERIAL in storage and u64 in the domain.
fn to_db_id(id: u64) -> Result<i64, RepositoryError> {
    i64::try_from(id).map_err(|_| RepositoryError::NotFound)
}

fn from_db_id(id: i64) -> Result<u64, RepositoryError> {
    u64::try_from(id).map_err(|_| RepositoryError::Storage(format!("negative id {} in storage", id)))
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: from_db_id(row.id)?,
            email: row.email,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct TodoRow {
    id: i64,
    user_id: i64,
    title: String,
    description: Option<String>,
    priority: Option<TodoPriority>,
    category: Option<String>,
    due_date: Option<DateTime<Utc>>,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TodoRow> for Todo {
    type Error = RepositoryError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        Ok(Todo {
            id: from_db_id(row.id)?,
            user_id: from_db_id(row.user_id)?,
            title: row.title,
            description: row.description,
            priority: row.priority,
            category: row.category,
            due_date: row.due_date,
            completed: row.completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// `users` table access.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users (email, password_hash, first_name, last_name) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        row.try_into()
    }

    async fn get_user_by_id(&self, id: u64) -> Result<User, RepositoryError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(to_db_id(id)?)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        row.try_into()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// `todos` table access. Ownership is part of every WHERE clause.
#[derive(Clone)]
pub struct PgTodoRepository {
    pool: PgPool,
}

impl PgTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoRepository for PgTodoRepository {
    async fn create(&self, user_id: u64, draft: TodoDraft) -> Result<Todo, RepositoryError> {
        let sql = format!(
            "INSERT INTO todos (user_id, title, description, priority, category, due_date, completed) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            TODO_COLUMNS
        );
        let row = sqlx::query_as::<_, TodoRow>(&sql)
            .bind(to_db_id(user_id)?)
            .bind(draft.title)
            .bind(draft.description)
            .bind(draft.priority)
            .bind(draft.category)
            .bind(draft.due_date)
            .bind(draft.completed)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn list_by_user(&self, user_id: u64) -> Result<Vec<Todo>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM todos WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            TODO_COLUMNS
        );
        sqlx::query_as::<_, TodoRow>(&sql)
            .bind(to_db_id(user_id)?)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Todo::try_from)
            .collect()
    }

    async fn get(&self, user_id: u64, id: u64) -> Result<Todo, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM todos WHERE id = $1 AND user_id = $2",
            TODO_COLUMNS
        );
        let row = sqlx::query_as::<_, TodoRow>(&sql)
            .bind(to_db_id(id)?)
            .bind(to_db_id(user_id)?)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        row.try_into()
    }

    async fn update(
        &self,
        user_id: u64,
        id: u64,
        draft: TodoDraft,
    ) -> Result<Todo, RepositoryError> {
        let sql = format!(
            "UPDATE todos \
             SET title = $1, description = $2, priority = $3, category = $4, due_date = $5, \
                 completed = $6, updated_at = NOW() \
             WHERE id = $7 AND user_id = $8 \
             RETURNING {}",
            TODO_COLUMNS
        );
        let row = sqlx::query_as::<_, TodoRow>(&sql)
            .bind(draft.title)
            .bind(draft.description)
            .bind(draft.priority)
            .bind(draft.category)
            .bind(draft.due_date)
            .bind(draft.completed)
            .bind(to_db_id(id)?)
            .bind(to_db_id(user_id)?)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        row.try_into()
    }

    async fn delete(&self, user_id: u64, id: u64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(to_db_id(id)?)
            .bind(to_db_id(user_id)?)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
