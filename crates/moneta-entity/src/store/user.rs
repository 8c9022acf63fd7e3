//! User store contract.

use async_trait::async_trait;
use uuid::Uuid;

use moneta_core::result::AppResult;

use crate::user::{CreateUser, User};

/// Persistence operations for users.
///
/// Deliberately minimal: account lifecycle is owned by an external
/// identity service; this core only needs lookup for existence checks and
/// snapshot enrichment.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Find a user by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Create a user record.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;
}
