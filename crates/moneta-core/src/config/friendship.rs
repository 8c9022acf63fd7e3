//! Friendship registry configuration.

use serde::{Deserialize, Serialize};

use crate::types::access::AccessLevel;

/// Friendship registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendshipConfig {
    /// Access level granted in both directions when a request is accepted.
    #[serde(default = "default_access_on_accept")]
    pub default_access_on_accept: AccessLevel,
}

impl Default for FriendshipConfig {
    fn default() -> Self {
        Self {
            default_access_on_accept: default_access_on_accept(),
        }
    }
}

fn default_access_on_accept() -> AccessLevel {
    AccessLevel::Limited
}
