//! # moneta-database
//!
//! PostgreSQL connection management and store implementations for Moneta.
//! The `repositories` module holds the sqlx-backed stores; the `memory`
//! module holds an in-memory backend implementing the same store traits
//! for single-node and test use.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
