use std::{env, net::SocketAddr};

use tracing::warn;
use url::Url;

use crate::error::AppError;

const DEV_SECRET_KEY: &str = "change-me-packwise-dev-secret";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub secret_key: String,
    pub token_ttl_hours: i64,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// API root; always ends with `/` so model paths can be joined onto it.
    pub base_url: Url,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://packwise.db?mode=rwc".to_string());
        let listen_addr: SocketAddr = env::var("APP_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?;

        let secret_key = match env::var("SECRET_KEY") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                warn!("SECRET_KEY not set, falling back to the development secret");
                DEV_SECRET_KEY.to_string()
            }
        };

        let token_ttl_hours = parse_var("TOKEN_TTL_HOURS", 24)?;
        if token_ttl_hours <= 0 {
            return Err(AppError::Config(
                "TOKEN_TTL_HOURS must be positive".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            listen_addr,
            secret_key,
            token_ttl_hours,
            gemini: GeminiConfig::from_env()?,
        })
    }
}

impl GeminiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta/";
    pub const DEFAULT_MODEL: &'static str = "gemini-1.5-pro";

    pub fn from_env() -> Result<Self, AppError> {
        let api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| AppError::Config("GEMINI_API_KEY must be set".to_string()))?;
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string());
        let base_url = parse_base_url(
            &env::var("GEMINI_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string()),
        )?;
        let timeout_secs = parse_var("GEMINI_TIMEOUT_SECS", 60)?;

        Ok(Self {
            api_key,
            model,
            base_url,
            timeout_secs,
        })
    }
}

pub fn parse_base_url(raw: &str) -> Result<Url, AppError> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|err| AppError::Config(format!("invalid GEMINI_BASE_URL: {err}")))
}

fn parse_var<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|err| AppError::Config(format!("invalid {name}: {err}"))),
        Err(_) => Ok(default),
    }
}
