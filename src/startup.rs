//! Application assembly shared by `main` and the integration tests.

use actix_cors::Cors;
use actix_web::{error::JsonPayloadError, web, HttpRequest};
use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::{Clock, SystemClock, TokenService};
use crate::error::AppError;
use crate::repository::{
    InMemoryTodoRepository, InMemoryUserRepository, PgTodoRepository, PgUserRepository,
    TodoRepository, UserRepository,
};
use crate::routes;
use crate::services::{AuthService, TodoService};

/// Everything a worker needs, built once and shared between workers.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub auth: Arc<AuthService>,
    pub todos: Arc<TodoService>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn new(
        tokens: Arc<TokenService>,
        users: Arc<dyn UserRepository>,
        todos: Arc<dyn TodoRepository>,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(users.clone(), tokens.clone())),
            todos: Arc::new(TodoService::new(todos)),
            tokens,
            users,
        }
    }

    /// Postgres-backed state.
    pub fn postgres(secret: &str, pool: PgPool) -> Result<Self, AppError> {
        let tokens = Arc::new(TokenService::new(secret)?);
        Ok(Self::new(
            tokens,
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgTodoRepository::new(pool)),
        ))
    }

    pub fn in_memory(secret: &str) -> Result<Self, AppError> {
        Self::in_memory_with_clock(secret, Arc::new(SystemClock))
    }

    /// In-memory state whose tokens are issued and checked against `clock`.
    pub fn in_memory_with_clock(secret: &str, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let tokens = Arc::new(TokenService::with_clock(secret, clock)?);
        Ok(Self::new(
            tokens,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryTodoRepository::new()),
        ))
    }
}

/// Undecodable JSON bodies answer 400 with the usual error body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        log::debug!("Rejected request body: {}", err);
        AppError::BadRequest("Invalid JSON format".into()).into()
    })
}

pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

/// Registers shared state and every route.
pub fn configure(state: &AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    let state = state.clone();
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(json_config())
            .app_data(web::Data::from(state.tokens))
            .app_data(web::Data::from(state.auth))
            .app_data(web::Data::from(state.todos))
            .app_data(web::Data::from(state.users))
            .service(routes::health::health)
            .service(routes::health::index)
            .service(web::scope("/api").configure(routes::config));
    }
}
