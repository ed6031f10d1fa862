use std::time::Duration;
use serde::{Deserialize, Serialize};
use shared::TallyPolicy;
use shared::service::DEFAULT_MAX_BATCH_SIZE;

/// Server settings read from Rocket's figment (`Rocket.toml`, `ROCKET_*`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Delay between snapshots on a live-update stream.
    #[serde(default = "default_live_update_interval_ms")]
    pub live_update_interval_ms: u64,
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    #[serde(default)]
    pub tally_policy: TallyPolicy,
    /// Origins (scheme and host, any port) that receive CORS headers.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_live_update_interval_ms() -> u64 {
    3000
}

fn default_max_batch_size() -> usize {
    DEFAULT_MAX_BATCH_SIZE
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost".to_string()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            live_update_interval_ms: default_live_update_interval_ms(),
            max_batch_size: default_max_batch_size(),
            tally_policy: TallyPolicy::default(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.live_update_interval_ms == 0 {
            return Err("live_update_interval_ms must be greater than zero".into());
        }
        if self.max_batch_size == 0 {
            return Err("max_batch_size must be greater than zero".into());
        }
        Ok(())
    }

    pub fn live_update_interval(&self) -> Duration {
        Duration::from_millis(self.live_update_interval_ms)
    }

    /// An entry matches its exact origin or that origin on any port.
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| {
            allowed == "*"
                || origin == allowed
                || origin
                    .strip_prefix(allowed.as_str())
                    .and_then(|rest| rest.strip_prefix(':'))
                    .is_some_and(|port| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
        })
    }
}
