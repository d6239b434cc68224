//! Client configuration.

use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.stripe.com";

/// Immutable settings shared by every call a client makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    /// Scheme and host; the API version segment is added per request.
    pub base_url: String,
    /// Deadline for a whole round-trip. `None` never times out.
    pub timeout: Option<Duration>,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reads `STRIPE_API_KEY` (required), `STRIPE_API_BASE` and
    /// `STRIPE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("STRIPE_API_KEY").map_err(|_| Error::EmptyApiKey)?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("STRIPE_API_BASE") {
            config.base_url = base_url;
        }
        if let Some(secs) = std::env::var("STRIPE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }
}
