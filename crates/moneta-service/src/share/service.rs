//! Share token issuance, resolution, and revocation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use moneta_access::{AccessEvaluator, ShareRateLimiter};
use moneta_core::config::sharing::SharingConfig;
use moneta_core::error::{AppError, ErrorKind};
use moneta_core::result::AppResult;
use moneta_core::types::pagination::{PageRequest, PageResponse};
use moneta_core::types::resource::ResourceKind;
use moneta_entity::share::{
    CreateSharedResource, SharePermission, SharedResource, ShareVisibility,
};
use moneta_entity::store::ShareStore;

use super::ledger::ShareAccessLedger;
use super::token::TokenGenerator;

/// Request to publish a share over a subset of the owner's data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShareRequest {
    /// The kind of resource being shared.
    pub resource_type: ResourceKind,
    /// IDs of the shared records.
    pub resource_refs: Vec<Uuid>,
    /// Permission granted to resolvers.
    pub permission: SharePermission,
    /// Visibility rule.
    pub visibility: ShareVisibility,
    /// Share lifetime in hours; falls back to the configured default.
    pub expires_in_hours: Option<i64>,
    /// Allow list, required for `SpecificUsers` visibility.
    pub allowed_user_ids: Vec<Uuid>,
    /// Optional label shown to viewers.
    pub share_name: Option<String>,
}

/// A freshly issued share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedShare {
    /// The share ID.
    pub share_id: Uuid,
    /// The token to embed in the share link.
    pub token: String,
    /// When the share expires, if ever.
    pub expires_at: Option<chrono::DateTime<Utc>>,
}

/// The outcome of a successful share resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedShare {
    /// The share ID.
    pub share_id: Uuid,
    /// The user whose data is shared.
    pub owner_user_id: Uuid,
    /// The kind of resource shared.
    pub resource_type: ResourceKind,
    /// IDs of the shared records.
    pub resource_refs: Vec<Uuid>,
    /// Permission the resolver holds over the refs.
    pub permission: SharePermission,
    /// Optional label.
    pub share_name: Option<String>,
}

/// Issues, resolves, and revokes shareable resource tokens.
///
/// Shares live independently of the friendship graph; the evaluator is
/// consulted only for `FriendsOnly` visibility.
#[derive(Clone)]
pub struct ShareTokenService {
    shares: Arc<dyn ShareStore>,
    ledger: ShareAccessLedger,
    evaluator: AccessEvaluator,
    rate_limiter: ShareRateLimiter,
    tokens: TokenGenerator,
    config: SharingConfig,
}

impl ShareTokenService {
    /// Creates a new share token service.
    pub fn new(
        shares: Arc<dyn ShareStore>,
        ledger: ShareAccessLedger,
        evaluator: AccessEvaluator,
        config: SharingConfig,
    ) -> Self {
        let rate_limiter =
            ShareRateLimiter::new(config.rate_limit_burst, config.rate_limit_refill_per_second);
        Self {
            shares,
            ledger,
            evaluator,
            rate_limiter,
            tokens: TokenGenerator::new(),
            config,
        }
    }

    /// Creates a new share owned by `owner_user_id`.
    ///
    /// Token uniqueness is enforced by the store; on collision a fresh
    /// token is generated, bounded by the configured attempt count.
    pub async fn create_share(
        &self,
        owner_user_id: Uuid,
        req: CreateShareRequest,
    ) -> AppResult<IssuedShare> {
        if req.resource_refs.is_empty() {
            return Err(AppError::validation("A share must reference at least one record"));
        }
        if req.visibility == ShareVisibility::SpecificUsers && req.allowed_user_ids.is_empty() {
            return Err(AppError::validation(
                "allowed_user_ids is required for specific-users visibility",
            ));
        }

        let expires_at = req
            .expires_in_hours
            .or(self.config.default_expiry_hours)
            .map(|hours| Utc::now() + Duration::hours(hours));

        let mut attempts = 0;
        loop {
            attempts += 1;
            let data = CreateSharedResource {
                share_token: self.tokens.generate(),
                owner_user_id,
                resource_type: req.resource_type,
                resource_refs: req.resource_refs.clone(),
                share_name: req.share_name.clone(),
                permission: req.permission,
                visibility: req.visibility,
                allowed_user_ids: req.allowed_user_ids.clone(),
                expires_at,
            };

            match self.shares.create(&data).await {
                Ok(share) => {
                    info!(
                        share_id = %share.id,
                        owner_user_id = %owner_user_id,
                        resource_type = %share.resource_type,
                        visibility = ?share.visibility,
                        "Share created"
                    );
                    return Ok(IssuedShare {
                        share_id: share.id,
                        token: share.share_token,
                        expires_at: share.expires_at,
                    });
                }
                Err(e) if e.is_conflict() && attempts < self.config.token_max_attempts => {
                    warn!(attempts, "Share token collision, regenerating");
                }
                Err(e) if e.is_conflict() => {
                    return Err(AppError::new(
                        ErrorKind::ShareCreationFailed,
                        format!("Token generation failed after {attempts} attempts"),
                    ));
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Resolves a token to the shared resource refs, enforcing validity
    /// and visibility, and records the access.
    pub async fn resolve(
        &self,
        token: &str,
        requesting_user_id: Option<Uuid>,
    ) -> AppResult<ResolvedShare> {
        if !self.rate_limiter.check(requesting_user_id, token).await {
            return Err(AppError::new(
                ErrorKind::ShareRateLimitExceeded,
                "Too many resolution attempts for this share",
            ));
        }

        let share = self
            .shares
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::new(ErrorKind::ShareNotFound, "No share for this token"))?;

        if !share.is_valid() {
            return Err(AppError::new(
                ErrorKind::ShareExpired,
                "This share has been revoked or has expired",
            ));
        }

        self.authorize(&share, requesting_user_id).await?;

        let share = self.shares.record_access(share.id).await?;
        if let Some(user_id) = requesting_user_id {
            self.ledger.record_access(user_id, share.id).await?;
        }

        Ok(ResolvedShare {
            share_id: share.id,
            owner_user_id: share.owner_user_id,
            resource_type: share.resource_type,
            resource_refs: share.resource_refs,
            permission: share.permission,
            share_name: share.share_name,
        })
    }

    /// Revokes a share. Only the owner may revoke; revocation is one-way
    /// and idempotent.
    pub async fn revoke(&self, token: &str, owner_user_id: Uuid) -> AppResult<SharedResource> {
        let share = self
            .shares
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::new(ErrorKind::ShareNotFound, "No share for this token"))?;

        if share.owner_user_id != owner_user_id {
            return Err(AppError::new(
                ErrorKind::ShareAccessDenied,
                "Only the owner may revoke a share",
            ));
        }

        let share = self.shares.deactivate(share.id).await?;
        info!(share_id = %share.id, "Share revoked");
        Ok(share)
    }

    /// Lists shares created by the given owner, newest first.
    pub async fn list_my_shares(
        &self,
        owner_user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<SharedResource>> {
        self.shares.list_by_owner(owner_user_id, page).await
    }

    async fn authorize(
        &self,
        share: &SharedResource,
        requesting_user_id: Option<Uuid>,
    ) -> AppResult<()> {
        match share.visibility {
            // Possession of the link is the whole check.
            ShareVisibility::Public | ShareVisibility::LinkOnly => Ok(()),
            ShareVisibility::SpecificUsers => match requesting_user_id {
                Some(user_id) if share.allows_user(user_id) => Ok(()),
                _ => Err(AppError::new(
                    ErrorKind::ShareAccessDenied,
                    "You are not on the allow list for this share",
                )),
            },
            ShareVisibility::FriendsOnly => match requesting_user_id {
                Some(user_id) if user_id == share.owner_user_id => Ok(()),
                Some(user_id) => {
                    if self
                        .evaluator
                        .can_access(share.owner_user_id, user_id)
                        .await?
                    {
                        Ok(())
                    } else {
                        Err(AppError::new(
                            ErrorKind::ShareAccessDenied,
                            "This share is limited to the owner's friends",
                        ))
                    }
                }
                None => Err(AppError::new(
                    ErrorKind::ShareAccessDenied,
                    "This share requires an identified caller",
                )),
            },
        }
    }
}

impl std::fmt::Debug for ShareTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareTokenService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
