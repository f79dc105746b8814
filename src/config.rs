//! Runtime configuration read from the environment.

use std::env;
use std::str::FromStr;

use tracing::warn;

use crate::scoring::PointsScheme;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_address: String,
    /// Postgres connection string. In-memory repositories are used when unset.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub token_expiration_days: i64,
    /// League points curve applied to newly recorded sessions.
    pub points_scheme: PointsScheme,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5);

        let jwt_secret = lookup("JWT_SECRET")
            .unwrap_or_else(|| "your-secret-key-change-in-production".to_string());

        let token_expiration_days = parse_or(&lookup, "TOKEN_EXPIRATION_DAYS", 365);

        let points_scheme = parse_or(&lookup, "LEADERBOARD_POINTS", PointsScheme::default());

        Self {
            bind_address,
            database_url,
            database_max_connections,
            jwt_secret,
            token_expiration_days,
            points_scheme,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Ignoring unparsable config value");
            default
        }),
        None => default,
    }
}
