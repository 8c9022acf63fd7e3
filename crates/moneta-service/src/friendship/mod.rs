//! Friendship registry service.

pub mod service;

pub use service::FriendshipService;
