use std::env;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::store::retry::RetryPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    /// Base URL of the hosted entry store. `None` runs the journal local-only.
    pub remote_store_url: Option<Url>,
    pub remote_api_key: String,
    pub remote_timeout_secs: u64,

    /// Base URL of blob storage used for profile photos.
    pub blob_store_url: Option<Url>,

    pub local_cache_path: PathBuf,

    /// HS256 secret for identity tokens. Without it nobody can sign in.
    pub auth_secret: Option<String>,

    pub retry_max_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),

            remote_store_url: env::var("REMOTE_STORE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .map(|s| s.parse().expect("REMOTE_STORE_URL must be a valid URL")),
            remote_api_key: env::var("REMOTE_API_KEY").unwrap_or_default(),
            remote_timeout_secs: env::var("REMOTE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),

            blob_store_url: env::var("BLOB_STORE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .map(|s| s.parse().expect("BLOB_STORE_URL must be a valid URL")),

            local_cache_path: env::var("LOCAL_CACHE_PATH")
                .unwrap_or_else(|_| "moodboard-cache.json".into())
                .into(),

            auth_secret: env::var("AUTH_SECRET").ok().filter(|s| !s.is_empty()),

            retry_max_attempts: env::var("RETRY_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "1".into())
                .parse()
                .unwrap_or(1),
            retry_backoff_ms: env::var("RETRY_BACKOFF_MS")
                .unwrap_or_else(|_| "1000".into())
                .parse()
                .unwrap_or(1000),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_max_attempts,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }
}

#[cfg(test)]
impl Config {
    /// Local-only configuration for tests: no remote, no blob store.
    pub fn for_tests(auth_secret: Option<&str>) -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            remote_store_url: None,
            remote_api_key: String::new(),
            remote_timeout_secs: 1,
            blob_store_url: None,
            local_cache_path: PathBuf::from("unused.json"),
            auth_secret: auth_secret.map(str::to_string),
            retry_max_attempts: 1,
            retry_backoff_ms: 0,
        }
    }
}
