//! Runtime Configuration
//! Mission: Load every tunable from the environment once, at startup

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use tracing::warn;

/// Fallback signing secret for local development only. Production
/// startup refuses to run without an explicit JWT_SECRET.
const DEV_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";

/// Deployment posture, from APP_ENV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Development,
    Production,
}

impl AppMode {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => AppMode::Production,
            _ => AppMode::Development,
        }
    }
}

/// SMTP relay settings; absent means reset mails are logged instead of sent.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: AppMode,
    pub port: u16,
    pub database_path: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub cookie_expires_days: i64,
    pub bcrypt_cost: u32,
    /// Reset-link base and the CORS origin allowed to send credentials.
    pub frontend_url: String,
    pub smtp: Option<SmtpConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let mode = AppMode::from_str(&env::var("APP_ENV").unwrap_or_default());

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                if mode == AppMode::Production {
                    anyhow::bail!("JWT_SECRET must be set when APP_ENV=production");
                }
                warn!("⚠️  JWT_SECRET not set - using built-in development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(3000);

        let database_path = resolve_data_path(env::var("DATABASE_PATH").ok(), "shipway.db");

        let token_ttl_hours = env::var("JWT_EXPIRES_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(24);

        let cookie_expires_days = env::var("COOKIE_EXPIRES_TIME")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(1);

        let bcrypt_cost = env::var("BCRYPT_COST")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|v| (4..=31).contains(v))
            .unwrap_or(bcrypt::DEFAULT_COST);

        let frontend_url = env::var("FRONTEND_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "http://localhost:5173".to_string());

        let smtp = match (
            env::var("SMTP_HOST"),
            env::var("SMTP_USERNAME"),
            env::var("SMTP_PASSWORD"),
            env::var("SMTP_FROM"),
        ) {
            (Ok(host), Ok(username), Ok(password), Ok(from)) => Some(SmtpConfig {
                host,
                port: env::var("SMTP_PORT")
                    .ok()
                    .and_then(|v| v.parse::<u16>().ok())
                    .unwrap_or(587),
                username,
                password,
                from,
            }),
            _ => None,
        };

        Ok(Self {
            mode,
            port,
            database_path,
            jwt_secret,
            token_ttl_hours,
            cookie_expires_days,
            bcrypt_cost,
            frontend_url,
            smtp,
        })
    }
}

/// Relative data paths are anchored to the crate directory, not the
/// caller's cwd, so running from elsewhere doesn't create a second DB.
fn resolve_data_path(env_value: Option<String>, default_filename: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    match env_value.filter(|v| !v.trim().is_empty()) {
        None => base.join(default_filename).to_string_lossy().to_string(),
        Some(raw) => {
            let p = PathBuf::from(raw);
            if p.is_absolute() {
                p.to_string_lossy().to_string()
            } else {
                base.join(p).to_string_lossy().to_string()
            }
        }
    }
}
