//! Friendship domain entities.

pub mod model;

pub use model::{CreateFriendship, Friendship, FriendshipStatus};
pub use moneta_core::types::access::AccessLevel;
