use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    /// JSON array of `{name, label}` replacing the built-in action catalog.
    pub catalog_path: Option<String>,
}

/// Bearer tokens live for 8 hours unless overridden.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 8 * 60;

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = var("DATABASE_URL").context("DATABASE_URL is required")?;
        let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v.parse::<u32>().context("DATABASE_MAX_CONNECTIONS must be a number")?,
            None => 10,
        };
        let port = match var("APP_PORT") {
            Some(v) => v.parse::<u16>().context("APP_PORT must be a port number")?,
            None => 8080,
        };
        let jwt = JwtConfig {
            secret: var("JWT_SECRET").context("JWT_SECRET is required")?,
            issuer: var("JWT_ISSUER").unwrap_or_else(|| "trainlog".into()),
            audience: var("JWT_AUDIENCE").unwrap_or_else(|| "trainlog-users".into()),
            ttl_minutes: var("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|m| *m > 0)
                .unwrap_or(DEFAULT_TOKEN_TTL_MINUTES),
        };

        Ok(Self {
            database_url,
            max_connections,
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            jwt,
            catalog_path: var("ACTION_CATALOG_PATH").filter(|p| !p.is_empty()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
