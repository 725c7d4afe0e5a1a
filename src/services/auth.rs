use lazy_static::lazy_static;
use std::sync::Arc;
use validator::validate_email;

use crate::auth::password::{
    check_password_policy, hash_password, hash_password_blocking, verify_password,
    verify_password_blocking,
};
use crate::auth::{LoginRequest, RefreshTokenRequest, RegisterRequest, TokenPair, TokenService};
use crate::error::{AppError, ValidationReason};
use crate::models::{NewUser, User};
use crate::repository::{RepositoryError, UserRepository};

lazy_static! {
    // Verified against when the email is unknown, so both login failures cost one bcrypt check.
    static ref TIMING_GUARD_HASH: Option<String> = hash_password("timing-guard-password")
        .map_err(|e| log::error!("Failed to build login timing guard hash: {}", e))
        .ok();
}

/// Registration, login and token refresh.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Creates an account. Rules are checked in a fixed order and the first broken
    /// one is reported.
    pub async fn register(&self, request: Option<RegisterRequest>) -> Result<User, AppError> {
        let request = request.ok_or(AppError::Validation(ValidationReason::RequestNil))?;

        if request.email.is_empty() {
            return Err(AppError::Validation(ValidationReason::EmailRequired));
        }
        if !validate_email(request.email.as_str()) {
            return Err(AppError::Validation(ValidationReason::EmailInvalidFormat));
        }
        check_password_policy(&request.password).map_err(AppError::Validation)?;

        let password_hash = hash_password_blocking(request.password).await?;

        let user = self
            .users
            .create_user(NewUser {
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                password_hash,
            })
            .await?;

        log::info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Exchanges credentials for a token pair.
    ///
    /// An unknown email and a wrong password produce the same error.
    pub async fn login(&self, request: Option<LoginRequest>) -> Result<TokenPair, AppError> {
        let request = request.ok_or(AppError::Validation(ValidationReason::RequestNil))?;

        if request.email.is_empty() {
            return Err(AppError::Validation(ValidationReason::EmailRequired));
        }
        if request.password.is_empty() {
            return Err(AppError::Validation(ValidationReason::PasswordRequired));
        }

        let user = match self.users.get_user_by_email(&request.email).await {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => {
                let password = request.password;
                let guard = tokio::task::spawn_blocking(move || {
                    TIMING_GUARD_HASH
                        .as_ref()
                        .map(|hash| verify_password(&password, hash))
                })
                .await;
                match guard {
                    Ok(Some(Ok(_))) => {}
                    Ok(Some(Err(e))) => log::error!("Login timing guard check failed: {}", e),
                    Ok(None) => log::error!("Login timing guard hash is unavailable"),
                    Err(e) => log::error!("Login timing guard task failed: {}", e),
                }
                log::warn!("Login failed: unknown email");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        let matches =
            verify_password_blocking(request.password, user.password_hash.clone()).await?;
        if !matches {
            log::warn!("Login failed: wrong password for user {}", user.id);
            return Err(AppError::InvalidCredentials);
        }

        let pair = self.tokens.issue_pair(&user)?;
        log::info!("User {} logged in", user.id);
        Ok(pair)
    }

    pub async fn refresh(
        &self,
        request: Option<RefreshTokenRequest>,
    ) -> Result<TokenPair, AppError> {
        let request = request.ok_or(AppError::Validation(ValidationReason::RequestNil))?;

        if request.refresh_token.is_empty() {
            return Err(AppError::Validation(ValidationReason::RefreshTokenRequired));
        }

        self.tokens.refresh(&request.refresh_token)
    }

    pub async fn get_user_by_id(&self, id: u64) -> Result<User, AppError> {
        if id == 0 {
            return Err(AppError::Validation(ValidationReason::InvalidId));
        }
        self.users.get_user_by_id(id).await.map_err(user_lookup_error)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<User, AppError> {
        if email.is_empty() {
            return Err(AppError::Validation(ValidationReason::EmailRequired));
        }
        self.users
            .get_user_by_email(email)
            .await
            .map_err(user_lookup_error)
    }
}

fn user_lookup_error(error: RepositoryError) -> AppError {
    match error {
        RepositoryError::NotFound => AppError::NotFound("User not found".into()),
        other => other.into(),
    }
}
