//! # moneta-service
//!
//! Business orchestration for Moneta: the friendship registry, the share
//! token service, and the share access ledger. Services depend only on
//! the store traits and the access evaluator; persistence backends are
//! injected at construction.

pub mod friendship;
pub mod share;
