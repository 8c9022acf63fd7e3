//! Store contracts implemented by the persistence backends.
//!
//! Services and the access evaluator depend only on these traits; the
//! `moneta-database` crate provides both a PostgreSQL implementation and
//! an in-memory one for single-node and test use.

pub mod friendship;
pub mod share;
pub mod share_access;
pub mod user;

pub use friendship::FriendshipStore;
pub use share::ShareStore;
pub use share_access::ShareAccessStore;
pub use user::UserStore;
