use std::time::Duration;

use log::*;
use spg_common::Secret;

pub const DEFAULT_JOURNAL_API_URL: &str = "http://localhost:18606/api/v1";
pub const DEFAULT_JOURNAL_API_TIMEOUT: u64 = 5;
/// Journal bundle info is cached for an hour
pub const DEFAULT_JOURNAL_CACHE_TIMEOUT: u64 = 3600;

#[derive(Debug, Clone)]
pub struct JournalApiConfig {
    pub base_url: String,
    pub access_token: Secret<String>,
    pub timeout: Duration,
    pub cache_timeout: Duration,
}

impl Default for JournalApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_JOURNAL_API_URL.to_string(),
            access_token: Secret::default(),
            timeout: Duration::from_secs(DEFAULT_JOURNAL_API_TIMEOUT),
            cache_timeout: Duration::from_secs(DEFAULT_JOURNAL_CACHE_TIMEOUT),
        }
    }
}

impl JournalApiConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("SPG_JOURNAL_API_URL").unwrap_or_else(|_| {
            warn!("🪛️ SPG_JOURNAL_API_URL not set, using {DEFAULT_JOURNAL_API_URL}");
            DEFAULT_JOURNAL_API_URL.to_string()
        });
        let access_token = Secret::new(std::env::var("SPG_JOURNAL_API_TOKEN").unwrap_or_else(|_| {
            warn!("🪛️ SPG_JOURNAL_API_TOKEN not set. Requests to the journal API will be unauthenticated.");
            String::default()
        }));
        let timeout = seconds_from_env("SPG_JOURNAL_API_TIMEOUT", DEFAULT_JOURNAL_API_TIMEOUT);
        let cache_timeout = seconds_from_env("SPG_JOURNAL_CACHE_TIMEOUT", DEFAULT_JOURNAL_CACHE_TIMEOUT);
        Self { base_url: base_url.trim_end_matches('/').to_string(), access_token, timeout, cache_timeout }
    }
}

fn seconds_from_env(var: &str, default: u64) -> Duration {
    let secs = std::env::var(var)
        .ok()
        .and_then(|s| {
            s.parse::<u64>()
                .map_err(|e| warn!("🪛️ {var} is not a valid number of seconds: {e}. Using {default}"))
                .ok()
        })
        .unwrap_or(default);
    Duration::from_secs(secs)
}
