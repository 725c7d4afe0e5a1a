use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::AuthenticatedUser;
use crate::auth::token::TokenService;
use crate::error::AppError;

/// Requires a valid bearer access token on every request it wraps.
///
/// Reads the `TokenService` from app data. On success the caller is stored in
/// request extensions as an [`AuthenticatedUser`]; otherwise the request is
/// answered with the JSON error body and never reaches the handler.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

/// Pulls the token out of `Authorization: Bearer <token>`.
fn bearer_token(req: &ServiceRequest) -> Result<&str, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Authorization header required".into()))?;

    let value = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header format".into()))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".into()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized("Token required".into()));
    }
    Ok(token)
}

fn authenticate(req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| AppError::Internal("token service is not configured".into()))?;

    let token = bearer_token(req)?;
    let claims = tokens.validate_access(token).map_err(|e| {
        log::debug!("Access token rejected on {}: {}", req.path(), e);
        AppError::from(e)
    })?;

    Ok(AuthenticatedUser {
        user_id: claims.user_id,
        email: claims.user_email,
    })
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(app_err) => {
                let response = req.into_response(app_err.error_response());
                Box::pin(async move { Ok(response.map_into_right_body()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use crate::models::User;
    use actix_web::{http::StatusCode, test, App, HttpResponse};
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(format!("{}:{}", user.user_id, user.email))
    }

    fn user() -> User {
        let now = Utc::now();
        User {
            id: 9,
            email: "gate@example.com".to_string(),
            password_hash: String::new(),
            first_name: "G".to_string(),
            last_name: "K".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[actix_rt::test]
    async fn test_gate_outcomes() {
        let clock = Arc::new(ManualClock::starting_now());
        let tokens = TokenService::with_clock("middleware_secret", clock.clone()).unwrap();
        let pair = tokens.issue_pair(&user()).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(tokens))
                .service(
                    web::scope("/private")
                        .wrap(AuthMiddleware)
                        .route("", web::get().to(whoami)),
                ),
        )
        .await;

        let cases = [
            (None, StatusCode::UNAUTHORIZED),
            (Some(format!("Basic {}", pair.access_token)), StatusCode::UNAUTHORIZED),
            (Some("Bearer ".to_string()), StatusCode::UNAUTHORIZED),
            (Some(format!("Bearer {}", pair.refresh_token)), StatusCode::UNAUTHORIZED),
            (Some("Bearer not.a.token".to_string()), StatusCode::UNAUTHORIZED),
            (Some(format!("Bearer {}", pair.access_token)), StatusCode::OK),
        ];

        for (header, expected) in cases {
            let mut req = test::TestRequest::get().uri("/private");
            if let Some(value) = header.clone() {
                req = req.insert_header((AUTHORIZATION, value));
            }
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), expected, "header {:?}", header);
        }

        let req = test::TestRequest::get()
            .uri("/private")
            .insert_header((AUTHORIZATION, format!("Bearer {}", pair.access_token)))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, web::Bytes::from_static(b"9:gate@example.com"));

        clock.advance(Duration::minutes(15));
        let req = test::TestRequest::get()
            .uri("/private")
            .insert_header((AUTHORIZATION, format!("Bearer {}", pair.access_token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
