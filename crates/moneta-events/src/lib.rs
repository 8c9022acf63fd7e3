//! # moneta-events
//!
//! Builds normalized activity events from domain mutations and hands them
//! to the message transport on a bounded worker pool. Dispatch never
//! blocks or fails the caller's primary operation: failures are logged
//! and dead-lettered, at-most-once.

pub mod builder;
pub mod dead_letter;
pub mod dispatcher;
pub mod transport;

pub use builder::{ActivityEventBuilder, ActivityInput};
pub use dead_letter::DeadLetterSink;
pub use dispatcher::EventDispatcher;
pub use transport::{EventTransport, MemoryTransport};
