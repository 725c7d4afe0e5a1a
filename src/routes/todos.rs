use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{CreateTodoRequest, UpdateTodoRequest},
    services::TodoService,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

/// Lists the caller's todos, newest first.
///
/// ## Responses:
/// - `200 OK`: JSON array of todos.
/// - `401 Unauthorized`: missing or rejected access token.
#[get("")]
pub async fn get_todos(
    todos: web::Data<TodoService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let list = todos.list(&user).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// Creates a todo owned by the caller.
///
/// ## Responses:
/// - `201 Created`: the stored todo.
/// - `400 Bad Request`: a field rule was broken.
#[post("")]
pub async fn create_todo(
    todos: web::Data<TodoService>,
    user: AuthenticatedUser,
    todo_data: web::Json<CreateTodoRequest>,
) -> Result<impl Responder, AppError> {
    let todo = todos.create(&user, todo_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(todo))
}

#[get("/{id}")]
pub async fn get_todo(
    todos: web::Data<TodoService>,
    user: AuthenticatedUser,
    id: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    let todo = todos.get(&user, id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(todo))
}

/// Replaces the editable fields of one of the caller's todos.
#[put("/{id}")]
pub async fn update_todo(
    todos: web::Data<TodoService>,
    user: AuthenticatedUser,
    id: web::Path<u64>,
    todo_data: web::Json<UpdateTodoRequest>,
) -> Result<impl Responder, AppError> {
    let todo = todos
        .update(&user, id.into_inner(), todo_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(todo))
}

#[delete("/{id}")]
pub async fn delete_todo(
    todos: web::Data<TodoService>,
    user: AuthenticatedUser,
    id: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    todos.delete(&user, id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
