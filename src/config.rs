use std::env;

use crate::error::AppError;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

pub struct Config {
    /// Absent means in-memory storage.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    /// When set, non-public routes require a matching `X-API-Key` header.
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Builds the configuration from `lookup`. Empty values count as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let jwt_secret = get("JWT_SECRET")
            .ok_or_else(|| AppError::Configuration("JWT_SECRET must be set".into()))?;

        let server_port = match get("SERVER_PORT") {
            Some(port) => port.parse().map_err(|_| {
                AppError::Configuration(format!("SERVER_PORT must be a number, got {:?}", port))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database_url: get("DATABASE_URL"),
            server_port,
            server_host: get("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            jwt_secret,
            api_key: get("API_KEY"),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
