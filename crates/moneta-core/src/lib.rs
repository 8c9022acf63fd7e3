//! # moneta-core
//!
//! Core crate for Moneta. Contains configuration schemas, shared domain
//! types, the unified activity event shape, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Moneta crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
