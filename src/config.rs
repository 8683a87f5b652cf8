use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub ai_timeout_secs: u64,
    pub frontend_dir: String,
    pub cors_origin: String,
    pub cookie_secure: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let defaults = Self::default();
        Ok(Self {
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .unwrap_or(defaults.gemini_api_key),
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or(defaults.gemini_base_url),
            gemini_model: std::env::var("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            ai_timeout_secs: parse_var("AI_TIMEOUT_SECS")?.unwrap_or(defaults.ai_timeout_secs),
            frontend_dir: std::env::var("FRONTEND_DIR").unwrap_or(defaults.frontend_dir),
            cors_origin: std::env::var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            cookie_secure: parse_var("COOKIE_SECURE")?.unwrap_or(defaults.cookie_secure),
        })
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_secs)
    }

    pub fn ai_configured(&self) -> bool {
        !self.gemini_api_key.trim().is_empty()
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", name, e)),
        _ => Ok(None),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 21547,
            database_url: "sqlite:genjira.db".into(),
            gemini_api_key: String::new(),
            gemini_base_url: "https://generativelanguage.googleapis.com".into(),
            gemini_model: "gemini-2.5-flash".into(),
            ai_timeout_secs: 60,
            frontend_dir: "../frontend/dist".into(),
            cors_origin: "http://localhost:21548,http://127.0.0.1:21548".into(),
            cookie_secure: false,
        }
    }
}
