use crate::error::{AutoAtError, Result};
use std::time::Duration;

/// Default freshness window for a cached group roster (50 minutes)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3000;

#[derive(Debug, Clone)]
pub struct Settings {
    pub onebot: OneBotConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone)]
pub struct OneBotConfig {
    pub api_url: String,
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

pub fn load_settings() -> Result<Settings> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let onebot = OneBotConfig {
        api_url: std::env::var("ONEBOT_API_URL")
            .map_err(|_| AutoAtError::Config("ONEBOT_API_URL not set".to_string()))?
            .trim_end_matches('/')
            .to_string(),
        access_token: std::env::var("ONEBOT_ACCESS_TOKEN")
            .ok()
            .filter(|t| !t.is_empty()),
        timeout_secs: parse_var("ONEBOT_TIMEOUT_SECS", 10)?,
    };

    let cache = CacheConfig {
        ttl_secs: parse_var("AUTO_AT_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?,
    };

    Ok(Settings { onebot, cache })
}

fn parse_var(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AutoAtError::Config(format!("Invalid {}", name))),
        Err(_) => Ok(default),
    }
}
