use crate::{
    auth::{LoginRequest, RefreshTokenRequest, RegisterRequest},
    error::AppError,
    services::AuthService,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Register a new user
///
/// Creates the account and returns it without the password. A JSON `null` body is
/// reported as `request-nil`.
#[post("/register")]
pub async fn register(
    auth: web::Data<AuthService>,
    register_data: web::Json<Option<RegisterRequest>>,
) -> Result<impl Responder, AppError> {
    let user = auth.register(register_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Authenticates with email and password and returns an access/refresh token pair.
#[post("/login")]
pub async fn login(
    auth: web::Data<AuthService>,
    login_data: web::Json<Option<LoginRequest>>,
) -> Result<impl Responder, AppError> {
    let pair = auth.login(login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(pair))
}

/// Refresh access token
///
/// Exchanges a refresh token for a new access token. The refresh token is returned as-is.
#[post("/refresh")]
pub async fn refresh(
    auth: web::Data<AuthService>,
    refresh_data: web::Json<Option<RefreshTokenRequest>>,
) -> Result<impl Responder, AppError> {
    let pair = auth.refresh(refresh_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(pair))
}
