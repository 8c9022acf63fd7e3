//! Capability tiers for delegated access.

use serde::{Deserialize, Serialize};

/// The capability one party holds over another party's financial data.
///
/// Tiers are ordered by scope rather than forming a strict lattice:
/// `Limited` exposes current-period aggregate figures only, `Summary` adds
/// historical aggregates, `Read` is full read of itemized records, and
/// `Write`/`Full` add create/update. `Full` additionally implies delete
/// where a domain service chooses to honor it; share `Edit` permission
/// never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-types", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx-types",
    sqlx(type_name = "access_level", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// No access.
    None,
    /// Current-period aggregate figures only.
    Limited,
    /// Historical aggregate summaries.
    Summary,
    /// Full read of itemized records.
    Read,
    /// Read plus create/update.
    Write,
    /// Read plus create/update, and delete where honored.
    Full,
}

impl AccessLevel {
    /// Whether this level grants any visibility at all.
    pub fn can_view(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether this level grants create/update rights.
    pub fn can_modify(&self) -> bool {
        matches!(self, Self::Write | Self::Full)
    }

    /// Whether this level grants delete rights, for domain services that
    /// gate deletion separately from other writes.
    pub fn can_delete(&self) -> bool {
        matches!(self, Self::Full)
    }

    /// Return the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Limited => "limited",
            Self::Summary => "summary",
            Self::Read => "read",
            Self::Write => "write",
            Self::Full => "full",
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_grants_nothing() {
        assert!(!AccessLevel::None.can_view());
        assert!(!AccessLevel::None.can_modify());
        assert!(!AccessLevel::None.can_delete());
    }

    #[test]
    fn test_read_tiers_cannot_modify() {
        for level in [AccessLevel::Limited, AccessLevel::Summary, AccessLevel::Read] {
            assert!(level.can_view());
            assert!(!level.can_modify());
        }
    }

    #[test]
    fn test_write_and_full_modify_but_only_full_deletes() {
        assert!(AccessLevel::Write.can_modify());
        assert!(!AccessLevel::Write.can_delete());
        assert!(AccessLevel::Full.can_modify());
        assert!(AccessLevel::Full.can_delete());
    }
}
