//! # moneta-access
//!
//! The authorization contract exposed to every domain service: given a
//! data owner and an actor, what may the actor do? Also hosts the share
//! resolution rate limiter.

pub mod evaluator;
pub mod rate_limit;

pub use evaluator::AccessEvaluator;
pub use rate_limit::ShareRateLimiter;
