//! Environment-driven server configuration.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Public base URL prefixed onto stored image paths.
    pub base_url: String,
    pub database_path: String,
    pub upload_dir: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    /// Model used by every team member.
    pub model: String,
    pub analysis_timeout_secs: u64,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using insecure development key");
            "dev-secret-change-in-production".to_string()
        });

        Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:8000"),
            base_url: env_or("BASE_URL", "http://localhost:8000"),
            database_path: env_or("DATABASE_URL", "data/dermalens.db"),
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads/skin-images")),
            jwt_secret,
            token_ttl_minutes: parse_env("JWT_EXPIRATION_MINUTES", 1440),
            model: env_or("DERMALENS_MODEL", "gpt-4o"),
            analysis_timeout_secs: parse_env("ANALYSIS_TIMEOUT_SECS", 120),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
