//! sqlx-backed store implementations.

pub mod friendship;
pub mod share;
pub mod share_access;
pub mod user;

pub use friendship::FriendshipRepository;
pub use share::ShareRepository;
pub use share_access::ShareAccessRepository;
pub use user::UserRepository;
