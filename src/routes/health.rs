use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::repository::UserRepository;

/// Health check endpoint
///
/// Returns the current status of the API and timestamp. Answers 503 when storage
/// does not respond.
#[get("/health")]
pub async fn health(users: web::Data<dyn UserRepository>) -> impl Responder {
    match users.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "timestamp": Utc::now()
        })),
        Err(e) => {
            log::error!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unavailable",
                "timestamp": Utc::now()
            }))
        }
    }
}

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "message": "Welcome to the Todo List API",
        "endpoints": {
            "health": "/health",
            "auth": "/api/auth",
            "todos": "/api/todos"
        }
    }))
}
