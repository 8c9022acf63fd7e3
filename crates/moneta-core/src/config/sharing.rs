//! Share token configuration.

use serde::{Deserialize, Serialize};

/// Share token issuance and resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharingConfig {
    /// Default share lifetime in hours when the creator does not specify
    /// one. `None` means shares do not expire until revoked.
    #[serde(default)]
    pub default_expiry_hours: Option<i64>,
    /// Maximum attempts to generate a globally-unique token before the
    /// creation fails.
    #[serde(default = "default_token_max_attempts")]
    pub token_max_attempts: u32,
    /// Token-bucket burst size for share resolution, per caller+token.
    #[serde(default = "default_rate_limit_burst")]
    pub rate_limit_burst: u32,
    /// Token-bucket refill rate per second for share resolution.
    #[serde(default = "default_rate_limit_refill")]
    pub rate_limit_refill_per_second: f64,
}

impl Default for SharingConfig {
    fn default() -> Self {
        Self {
            default_expiry_hours: None,
            token_max_attempts: default_token_max_attempts(),
            rate_limit_burst: default_rate_limit_burst(),
            rate_limit_refill_per_second: default_rate_limit_refill(),
        }
    }
}

fn default_token_max_attempts() -> u32 {
    5
}

fn default_rate_limit_burst() -> u32 {
    10
}

fn default_rate_limit_refill() -> f64 {
    1.0
}
