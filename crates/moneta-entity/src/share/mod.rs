//! Shared resource domain entities.

pub mod access_log;
pub mod model;

pub use access_log::ShareAccessLog;
pub use model::{CreateSharedResource, SharePermission, SharedResource, ShareVisibility};
