use std::env::vars;

use log::info;
use serde::Deserialize;
use thiserror::Error;
use ustr::Ustr;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration from environment: {0}")]
    Env(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessConfig {
    pub api_base_url: String,
}

// Environment variables, all optional.
#[derive(Deserialize)]
struct RawConfig {
    bidboard_api_base_url: Option<String>,
}

impl BusinessConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
        }
    }

    /// Root of the REST API the collaborators talk to.
    ///
    /// An empty base URL means "same origin", which yields a relative `/api`.
    pub fn api_url(&self) -> Ustr {
        let base = self.api_base_url.trim_end_matches('/');
        if base.is_empty() {
            Ustr::from("/api")
        } else {
            Ustr::from(format!("{base}/api").as_str())
        }
    }

    /// Reads `BIDBOARD_API_BASE_URL`, falling back to [`DEFAULT_API_BASE_URL`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_env::from_iter(vars()).map_err(|err| ConfigError::Env(err.to_string()))?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawConfig) -> Self {
        match raw.bidboard_api_base_url {
            Some(url) => {
                info!("Using provided BIDBOARD_API_BASE_URL: {url}");
                Self::new(url)
            }
            None => Self::default(),
        }
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}
