use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    Error, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::sync::Arc;

use crate::error::AppError;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Rejects requests without a matching `X-API-Key` header with 403.
///
/// `OPTIONS`, `/`, `/health` and everything under `/api/auth/` pass without a key.
#[derive(Clone)]
pub struct ApiKeyMiddleware {
    key: Arc<str>,
}

impl ApiKeyMiddleware {
    pub fn new(key: &str) -> Self {
        Self { key: Arc::from(key) }
    }
}

fn is_public(req: &ServiceRequest) -> bool {
    if req.method() == Method::OPTIONS {
        return true;
    }
    let path = req.path();
    path == "/" || path == "/health" || path.starts_with("/api/auth/")
}

// Compares without short-circuiting on the first differing byte.
fn keys_match(candidate: &[u8], expected: &[u8]) -> bool {
    if candidate.len() != expected.len() {
        return false;
    }
    let mut result = 0u8;
    for (a, b) in candidate.iter().zip(expected.iter()) {
        result |= a ^ b;
    }
    result == 0
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ApiKeyMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyMiddlewareService {
            service,
            key: self.key.clone(),
        }))
    }
}

pub struct ApiKeyMiddlewareService<S> {
    service: S,
    key: Arc<str>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyMiddlewareService<S>
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
        let allowed = is_public(&req)
            || req
                .headers()
                .get(API_KEY_HEADER)
                .map(|value| keys_match(value.as_bytes(), self.key.as_bytes()))
                .unwrap_or(false);

        if allowed {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        log::warn!("Rejected {} {} without a valid API key", req.method(), req.path());
        let err = AppError::Forbidden("Invalid or missing API key".into());
        let response = req.into_response(err.error_response());
        Box::pin(async move { Ok(response.map_into_right_body()) })
    }
}
