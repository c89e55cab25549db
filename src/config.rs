// src/config.rs

use std::env;

use anyhow::Context;

const DEV_JWT_SECRET: &str = "dev-only-insecure-secret";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub allow_origins: Vec<String>,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty(key) {
        Some(raw) => raw.parse().with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

impl Config {
    /// Reads the process environment (call `dotenvy::dotenv()` first).
    pub fn from_env() -> anyhow::Result<Self> {
        let server_address = match non_empty("SERVER_ADDRESS") {
            Some(addr) => addr,
            None => format!("0.0.0.0:{}", parsed::<u16>("PORT", 8080)?),
        };

        let allow_origins = non_empty("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "http://127.0.0.1:5500,http://127.0.0.1:5501".into())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let jwt_secret = non_empty("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using the development secret");
            DEV_JWT_SECRET.into()
        });

        Ok(Self {
            server_address,
            database_url: non_empty("DATABASE_URL"),
            db_max_connections: parsed("DB_MAX_CONNECTIONS", 10)?,
            allow_origins,
            jwt_secret,
            token_ttl_hours: parsed("TOKEN_TTL_HOURS", 24)?,
        })
    }
}
