use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::gateway::GatewayConfig;

/// Per-request timeout, fixed per process
const DEFAULT_TIMEOUT_MS: u64 = 60_000;
/// Retry budget for timeout-class failures
const DEFAULT_RETRY_ATTEMPTS: u32 = 2;
/// Flat wait between retry attempts
const DEFAULT_RETRY_BACKOFF_MS: u64 = 2_000;

/// Environment override for the API base URL
const API_BASE_ENV: &str = "KL_API_BASE";

/// Access-layer settings. Loaded once at startup and never mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Absolute base URL of the service. Unset or empty means requests use
    /// bare relative paths (same-origin deployment behind one host).
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_retry_attempts() -> u32 {
    DEFAULT_RETRY_ATTEMPTS
}

fn default_retry_backoff_ms() -> u64 {
    DEFAULT_RETRY_BACKOFF_MS
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    fn validate(&self) {
        if self.api.timeout_ms == 0 {
            panic!("api.timeout_ms must be greater than 0");
        }

        if let Some(base) = self.api.base_url.as_deref() {
            if !base.is_empty() {
                let parsed = url::Url::parse(base).expect("api.base_url is not a valid URL");
                if !matches!(parsed.scheme(), "http" | "https") {
                    panic!("api.base_url must be an http(s) URL, got {base}");
                }
            }
        }
    }

    pub fn load() -> Self {
        Self::load_with(&config_dir())
    }

    pub fn load_with(dir: &Path) -> Self {
        Self::load_from(dir, std::env::var(API_BASE_ENV).ok())
    }

    fn load_from(dir: &Path, base_override: Option<String>) -> Self {
        let path = dir.join("config.yaml");

        // create new if does not exist
        if !path.exists() {
            std::fs::create_dir_all(dir).expect("cannot create config directory");
            std::fs::write(&path, serde_yml::to_string(&Self::default()).unwrap())
                .expect("cannot write default config");
        }

        let config_str = std::fs::read_to_string(&path).expect("config file is not valid utf8");
        let mut config: Self = serde_yml::from_str(&config_str).expect("config is malformed");

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config).unwrap() {
            config.save_to(dir);
        }

        if let Some(base) = base_override {
            config.api.base_url = Some(base);
        }

        config.validate();

        config
    }

    pub fn save_to(&self, dir: &Path) {
        let config_str = serde_yml::to_string(&self).unwrap();
        if let Err(err) = std::fs::write(dir.join("config.yaml"), config_str) {
            log::error!("failed to save config: {err}");
        }
    }
}

impl ApiConfig {
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.base_url.clone(),
            timeout_ms: self.timeout_ms,
            max_retries: self.retry_attempts,
            retry_backoff_ms: self.retry_backoff_ms,
        }
    }
}

fn config_dir() -> PathBuf {
    let home = homedir::my_home()
        .ok()
        .flatten()
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join("kl")
}
