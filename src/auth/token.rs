use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::claims::{Claims, TokenPair, TokenType, UnverifiedClaims, BEARER, ISSUER};
use crate::auth::clock::{Clock, SystemClock};
use crate::error::AppError;
use crate::models::User;

/// Why a token was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    MalformedToken,
    /// The header names an algorithm outside the HMAC family.
    #[error("unexpected signing algorithm")]
    UnexpectedAlgorithm,
    #[error("token signature does not verify")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is not valid yet")]
    NotYetValid,
    /// Carries the offending claim.
    #[error("invalid token claims: {0}")]
    InvalidClaims(&'static str),
    #[error("expected a {expected} token")]
    WrongTokenType { expected: TokenType },
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => TokenError::UnexpectedAlgorithm,
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            ErrorKind::InvalidIssuer => TokenError::InvalidClaims("iss"),
            _ => TokenError::MalformedToken,
        }
    }
}

const HMAC_ALGORITHMS: [&str; 3] = ["HS256", "HS384", "HS512"];

/// Reclassifies a header that jsonwebtoken could not parse.
///
/// Unknown algorithm names such as `none` fail header deserialization before the
/// algorithm check runs. A readable header naming anything outside the HMAC family
/// is an algorithm substitution, not a malformed token.
fn classify_decode_error(token: &str, error: jsonwebtoken::errors::Error) -> TokenError {
    if !matches!(error.kind(), ErrorKind::Json(_) | ErrorKind::Base64(_)) {
        return error.into();
    }

    let alg = token
        .split('.')
        .next()
        .and_then(|segment| URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')).ok())
        .and_then(|bytes| serde_json::from_slice::<serde_json::Value>(&bytes).ok())
        .and_then(|header| header.get("alg").and_then(|alg| alg.as_str()).map(str::to_owned));

    match alg {
        Some(alg) if !HMAC_ALGORITHMS.contains(&alg.as_str()) => TokenError::UnexpectedAlgorithm,
        _ => TokenError::MalformedToken,
    }
}

/// Signs, verifies, and refreshes tokens with one shared HMAC secret.
///
/// Built once at startup and shared read-only between workers. The secret never
/// changes after construction.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Returns `AppError::Configuration` for an empty secret.
    pub fn new(secret: &str) -> Result<Self, AppError> {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: &str, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::Configuration("JWT_SECRET must not be empty".into()));
        }

        // Time and issuer checks run against `clock` in `decode_and_verify`, so the
        // library only checks structure, algorithm and signature.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            clock,
        })
    }

    /// Issues an access token (15 minutes) and a refresh token (7 days) for `user`.
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, TokenError> {
        let now = self.clock.now();
        let access = Claims::new(user.id, &user.email, TokenType::Access, now);
        let refresh = Claims::new(user.id, &user.email, TokenType::Refresh, now);

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
            token_type: BEARER.to_string(),
            expires_in: access.exp - now.timestamp(),
        })
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// The refresh token is returned unchanged: refresh tokens are not rotated on
    /// use. Every validation failure collapses into
    /// `AppError::InvalidOrExpiredRefreshToken`.
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self.validate_refresh(refresh_token).map_err(|e| {
            log::debug!("Refresh token rejected: {}", e);
            AppError::InvalidOrExpiredRefreshToken
        })?;

        let now = self.clock.now();
        let access = Claims::new(claims.user_id, &claims.user_email, TokenType::Access, now);

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: refresh_token.to_string(),
            token_type: BEARER.to_string(),
            expires_in: access.exp - now.timestamp(),
        })
    }

    /// Parses `token`, checks algorithm, signature, validity window and claims.
    ///
    /// The token is valid while `nbf <= now < exp`.
    pub fn decode_and_verify(&self, token: &str) -> Result<Claims, TokenError> {
        let raw = decode::<UnverifiedClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify_decode_error(token, e))?
            .claims;

        let now = self.clock.now().timestamp();
        if now < raw.nbf {
            return Err(TokenError::NotYetValid);
        }
        if now >= raw.exp {
            return Err(TokenError::Expired);
        }

        if raw.iss != ISSUER {
            return Err(TokenError::InvalidClaims("iss"));
        }
        if raw.user_id == 0 {
            return Err(TokenError::InvalidClaims("user_id"));
        }
        if raw.user_email.is_empty() {
            return Err(TokenError::InvalidClaims("user_email"));
        }
        let token_type =
            TokenType::parse(&raw.token_type).ok_or(TokenError::InvalidClaims("token_type"))?;

        Ok(Claims {
            user_id: raw.user_id,
            user_email: raw.user_email,
            token_type,
            iss: raw.iss,
            sub: raw.sub,
            iat: raw.iat,
            nbf: raw.nbf,
            exp: raw.exp,
        })
    }

    pub fn validate_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_as(token, TokenType::Access)
    }

    pub fn validate_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_as(token, TokenType::Refresh)
    }

    fn validate_as(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = self.decode_and_verify(token)?;
        if claims.token_type != expected {
            return Err(TokenError::WrongTokenType { expected });
        }
        Ok(claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}
