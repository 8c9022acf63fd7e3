//! Friendship entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use moneta_core::types::access::AccessLevel;

/// Lifecycle status of a friendship.
///
/// `Pending → {Accepted, Rejected, Cancelled}`. Rejected and cancelled
/// requests are deleted rather than retained; a fresh request must be
/// issued to retry. An accepted friendship ends only by row deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "friendship_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    /// Requested, awaiting the recipient's decision.
    Pending,
    /// Accepted; access grants are live.
    Accepted,
    /// Declined by the recipient.
    Rejected,
    /// Withdrawn by the requester.
    Cancelled,
}

/// A bidirectional friendship with independent per-direction access grants.
///
/// Each `*_access` field is the capability the **named party grants to the
/// other party**: `requester_access` is what the requester has extended to
/// the recipient, and `recipient_access` is what the recipient has
/// extended to the requester.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Friendship {
    /// Unique friendship identifier.
    pub id: Uuid,
    /// The user who sent the request.
    pub requester_id: Uuid,
    /// The user who received the request.
    pub recipient_id: Uuid,
    /// Lifecycle status.
    pub status: FriendshipStatus,
    /// Access the requester grants the recipient.
    pub requester_access: AccessLevel,
    /// Access the recipient grants the requester.
    pub recipient_access: AccessLevel,
    /// When the request was sent.
    pub created_at: DateTime<Utc>,
    /// When the row was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Friendship {
    /// Whether the given user is one of the two parties.
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.requester_id == user_id || self.recipient_id == user_id
    }

    /// The counterpart of the given party, if the user is a party at all.
    pub fn other_party(&self, user_id: Uuid) -> Option<Uuid> {
        if user_id == self.requester_id {
            Some(self.recipient_id)
        } else if user_id == self.recipient_id {
            Some(self.requester_id)
        } else {
            None
        }
    }

    /// The access level `granter` has extended to the other party.
    pub fn access_granted_by(&self, granter: Uuid) -> Option<AccessLevel> {
        if granter == self.requester_id {
            Some(self.requester_access)
        } else if granter == self.recipient_id {
            Some(self.recipient_access)
        } else {
            None
        }
    }

    /// Set the grant made by `granter`. Returns false if the user is not
    /// a party to this friendship.
    pub fn set_grant(&mut self, granter: Uuid, level: AccessLevel) -> bool {
        if granter == self.requester_id {
            self.requester_access = level;
            true
        } else if granter == self.recipient_id {
            self.recipient_access = level;
            true
        } else {
            false
        }
    }

    /// Whether the request is still awaiting a decision.
    pub fn is_pending(&self) -> bool {
        self.status == FriendshipStatus::Pending
    }

    /// Whether the friendship is live.
    pub fn is_accepted(&self) -> bool {
        self.status == FriendshipStatus::Accepted
    }
}

/// Data required to create a new friendship request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFriendship {
    /// The user sending the request.
    pub requester_id: Uuid,
    /// The user receiving the request.
    pub recipient_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(requester: Uuid, recipient: Uuid) -> Friendship {
        Friendship {
            id: Uuid::new_v4(),
            requester_id: requester,
            recipient_id: recipient,
            status: FriendshipStatus::Accepted,
            requester_access: AccessLevel::Read,
            recipient_access: AccessLevel::Write,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_grant_direction_follows_named_party() {
        let requester = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let friendship = sample(requester, recipient);

        // The requester has granted Read to the recipient; the recipient
        // has granted Write back to the requester.
        assert_eq!(
            friendship.access_granted_by(requester),
            Some(AccessLevel::Read)
        );
        assert_eq!(
            friendship.access_granted_by(recipient),
            Some(AccessLevel::Write)
        );
        assert_eq!(friendship.access_granted_by(Uuid::new_v4()), None);
    }

    #[test]
    fn test_set_grant_only_touches_own_field() {
        let requester = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let mut friendship = sample(requester, recipient);

        assert!(friendship.set_grant(recipient, AccessLevel::Full));
        assert_eq!(friendship.recipient_access, AccessLevel::Full);
        assert_eq!(friendship.requester_access, AccessLevel::Read);

        assert!(!friendship.set_grant(Uuid::new_v4(), AccessLevel::None));
    }

    #[test]
    fn test_other_party() {
        let requester = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let friendship = sample(requester, recipient);

        assert_eq!(friendship.other_party(requester), Some(recipient));
        assert_eq!(friendship.other_party(recipient), Some(requester));
        assert_eq!(friendship.other_party(Uuid::new_v4()), None);
    }
}
