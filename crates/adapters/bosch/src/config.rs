//! Bosch integration configuration.

use serde::Deserialize;

/// Configuration for the Bosch integration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoschConfig {
    /// How often every circuit is refreshed from the gateway, in seconds.
    pub update_interval_secs: u16,
    /// Delay before the follow-up refresh after a mode change, in milliseconds.
    pub mode_refresh_delay_ms: u64,
}

impl Default for BoschConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: 30,
            mode_refresh_delay_ms: 2000,
        }
    }
}
