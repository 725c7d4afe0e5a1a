//! Claim sets and token pairs.
//!
//! A claim set is built fresh for every issuance and only ever lives inside a
//! signed token. Nothing here is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed `iss` value of every token this service signs.
pub const ISSUER: &str = "todo-list-api";
/// Access tokens live for 15 minutes.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
/// Refresh tokens live for 7 days.
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;
/// `token_type` label of a `TokenPair`.
pub const BEARER: &str = "Bearer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }

    /// Lifetime of a token of this type, in seconds.
    pub fn ttl_secs(&self) -> i64 {
        match self {
            TokenType::Access => ACCESS_TOKEN_TTL_SECS,
            TokenType::Refresh => REFRESH_TOKEN_TTL_SECS,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "access" => Some(TokenType::Access),
            "refresh" => Some(TokenType::Refresh),
            _ => None,
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed payload of an access or refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub user_email: String,
    pub token_type: TokenType,
    /// Always [`ISSUER`].
    pub iss: String,
    /// `user:<id>`.
    pub sub: String,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Not before (seconds since epoch).
    pub nbf: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Builds a claim set valid from `now` for the lifetime of `token_type`.
    pub fn new(user_id: u64, user_email: &str, token_type: TokenType, now: DateTime<Utc>) -> Self {
        let issued_at = now.timestamp();
        Self {
            user_id,
            user_email: user_email.to_string(),
            token_type,
            iss: ISSUER.to_string(),
            sub: subject_for(user_id),
            iat: issued_at,
            nbf: issued_at,
            exp: issued_at + token_type.ttl_secs(),
        }
    }
}

pub fn subject_for(user_id: u64) -> String {
    format!("user:{}", user_id)
}

/// Claims as they come off the wire, before semantic checks.
///
/// Semantic fields default when absent so a missing issuer, user, email, or type
/// is reported as invalid claims. The time fields are structural and must be present.
#[derive(Debug, Deserialize)]
pub(crate) struct UnverifiedClaims {
    #[serde(default)]
    pub user_id: u64,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub iss: String,
    #[serde(default)]
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// An access/refresh token pair as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `"Bearer"`.
    pub token_type: String,
    /// Seconds until the access token expires.
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_claims_creation() {
        let now = Utc::now();
        let access = Claims::new(42, "test@example.com", TokenType::Access, now);

        assert_eq!(access.user_id, 42);
        assert_eq!(access.user_email, "test@example.com");
        assert_eq!(access.sub, "user:42");
        assert_eq!(access.iss, ISSUER);
        assert_eq!(access.nbf, access.iat);
        assert_eq!(access.exp - access.iat, 900);

        let refresh = Claims::new(42, "test@example.com", TokenType::Refresh, now);
        assert_eq!(refresh.exp - refresh.iat, 604_800);
    }

    #[test]
    fn test_wire_shape() {
        let claims = Claims::new(1, "a@b.com", TokenType::Refresh, Utc::now());
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["user_id"], 1);
        assert_eq!(json["user_email"], "a@b.com");
        assert_eq!(json["token_type"], "refresh");

        let pair = TokenPair {
            access_token: "a".into(),
            refresh_token: "r".into(),
            token_type: BEARER.into(),
            expires_in: 900,
        };
        assert_eq!(
            serde_json::to_value(&pair).unwrap(),
            serde_json::json!({
                "access_token": "a",
                "refresh_token": "r",
                "token_type": "Bearer",
                "expires_in": 900
            })
        );
    }

    #[test]
    fn test_token_type_parse() {
        assert_eq!(TokenType::parse("access"), Some(TokenType::Access));
        assert_eq!(TokenType::parse("refresh"), Some(TokenType::Refresh));
        assert_eq!(TokenType::parse("Access"), None);
        assert_eq!(TokenType::parse(""), None);
    }
}
