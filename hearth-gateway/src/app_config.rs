use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub images: ImageHostConfig,
    pub business_rules: BusinessRules,
}

/// Hosted backend endpoints (database REST, auth, RPC).
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

/// Third-party image host.
#[derive(Debug, Deserialize, Clone)]
pub struct ImageHostConfig {
    pub upload_url: String,
    pub client_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_service_fee_rate")]
    pub service_fee_rate: f64,
    #[serde(default = "default_trending_cache_seconds")]
    pub trending_cache_seconds: i64,
    #[serde(default = "default_trending_window_days")]
    pub trending_window_days: u32,
    #[serde(default = "default_recent_search_limit")]
    pub recent_search_limit: usize,
}

fn default_service_fee_rate() -> f64 {
    0.15
}

fn default_trending_cache_seconds() -> i64 {
    3600
}

fn default_trending_window_days() -> u32 {
    7
}

fn default_recent_search_limit() -> usize {
    5
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of HEARTH)
            // Eg.. `HEARTH_BACKEND__URL=...` would set `backend.url`
            .add_source(config::Environment::with_prefix("HEARTH").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
