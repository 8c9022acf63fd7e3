//! Per-entity notification routing defaults.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::events::activity::ActivityAction;
use crate::types::resource::ResourceKind;

/// Controls the `requires_notification` flag stamped onto built events.
///
/// Rules are keyed `"<entity>.<action>"`, e.g. `"expense.created"` or
/// `"payment_method.deleted"`. Anything without an explicit rule falls
/// back to `default_enabled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Fallback when no rule matches.
    #[serde(default = "default_true")]
    pub default_enabled: bool,
    /// Per-`"entity.action"` overrides.
    #[serde(default)]
    pub rules: HashMap<String, bool>,
}

impl NotificationsConfig {
    /// Whether an event for this entity kind and action should be routed
    /// to the notification consumer.
    pub fn notify(&self, kind: ResourceKind, action: ActivityAction) -> bool {
        let key = format!("{}.{}", kind.as_str(), action.as_str());
        self.rules.get(&key).copied().unwrap_or(self.default_enabled)
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            default_enabled: true,
            rules: HashMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}
