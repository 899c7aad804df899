use std::env;
use std::time::Duration;

use crate::jobs::cover::DEFAULT_MEME_API_URL;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub profile: String,
    /// Endpoint returning `{ data: { memes: [...] } }`
    pub meme_api_url: String,
    pub cover_http_timeout: Duration,
    pub cover_queue_capacity: usize,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup (the process environment in production)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = lookup("PROFILE").unwrap_or_else(|| "default".to_string());

        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| {
            if profile == "default" {
                "sqlite://book_catalog.db?mode=rwc".to_string()
            } else {
                format!("sqlite://book_catalog_{}.db?mode=rwc", profile)
            }
        });

        Self {
            database_url,
            port: lookup("PORT").and_then(|p| p.parse().ok()).unwrap_or(8000),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            profile,
            meme_api_url: lookup("MEME_API_URL")
                .unwrap_or_else(|| DEFAULT_MEME_API_URL.to_string()),
            cover_http_timeout: Duration::from_secs(
                lookup("COVER_HTTP_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            cover_queue_capacity: lookup("COVER_QUEUE_CAPACITY")
                .and_then(|s| s.parse().ok())
                .filter(|c: &usize| *c > 0)
                .unwrap_or(64),
            seed_demo: lookup("SEED_DEMO").is_some(),
        }
    }
}
