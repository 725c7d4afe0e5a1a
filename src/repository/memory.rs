//! Process-local repositories. Used by the test-suite and when the server runs
//! without `DATABASE_URL`.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{RepositoryError, TodoRepository, UserRepository};
use crate::models::{NewUser, Todo, TodoDraft, User};

struct Table<T> {
    next_id: u64,
    rows: BTreeMap<u64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Table<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut table = self.users.write().await;
        if table.rows.values().any(|existing| existing.email == user.email) {
            return Err(RepositoryError::DuplicateEmail);
        }

        let now = Utc::now();
        let id = table.allocate_id();
        let created = User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, created.clone());
        Ok(created)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        self.users
            .read()
            .await
            .rows
            .values()
            .find(|user| user.email == email)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_user_by_id(&self, id: u64) -> Result<User, RepositoryError> {
        self.users
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default)]
pub struct InMemoryTodoRepository {
    todos: RwLock<Table<Todo>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn create(&self, user_id: u64, draft: TodoDraft) -> Result<Todo, RepositoryError> {
        let mut table = self.todos.write().await;
        let now = Utc::now();
        let id = table.allocate_id();
        let todo = Todo {
            id,
            user_id,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            category: draft.category,
            due_date: draft.due_date,
            completed: draft.completed,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, todo.clone());
        Ok(todo)
    }

    async fn list_by_user(&self, user_id: u64) -> Result<Vec<Todo>, RepositoryError> {
        // Ids are allocated in creation order, so reverse id order is newest first.
        Ok(self
            .todos
            .read()
            .await
            .rows
            .values()
            .rev()
            .filter(|todo| todo.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get(&self, user_id: u64, id: u64) -> Result<Todo, RepositoryError> {
        self.todos
            .read()
            .await
            .rows
            .get(&id)
            .filter(|todo| todo.user_id == user_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(
        &self,
        user_id: u64,
        id: u64,
        draft: TodoDraft,
    ) -> Result<Todo, RepositoryError> {
        let mut table = self.todos.write().await;
        let todo = table
            .rows
            .get_mut(&id)
            .filter(|todo| todo.user_id == user_id)
            .ok_or(RepositoryError::NotFound)?;

        todo.title = draft.title;
        todo.description = draft.description;
        todo.priority = draft.priority;
        todo.category = draft.category;
        todo.due_date = draft.due_date;
        todo.completed = draft.completed;
        todo.updated_at = Utc::now();
        Ok(todo.clone())
    }

    async fn delete(&self, user_id: u64, id: u64) -> Result<(), RepositoryError> {
        let mut table = self.todos.write().await;
        match table.rows.get(&id) {
            Some(todo) if todo.user_id == user_id => {
                table.rows.remove(&id);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }
}
