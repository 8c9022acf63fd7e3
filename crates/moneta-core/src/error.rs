//! Unified application error types for Moneta.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Authorization and precondition
//! failures carry a dedicated [`ErrorKind`] so callers can branch on the
//! kind rather than parse messages.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
///
/// The `Friend*`, `AccessDenied`, and `Share*` kinds form the synchronous
/// authorization/precondition taxonomy: they are always resolved and
/// returned before any mutation occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// The caller does not have permission to perform the action.
    AccessDenied,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate entry, concurrent modification, etc.).
    Conflict,
    /// An internal error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// A friend request targeted the requesting user itself.
    FriendSelfRequest,
    /// A pending friend request already exists for the pair.
    FriendRequestAlreadySent,
    /// The pair is already friends.
    FriendAlreadyAdded,
    /// The referenced friend request does not exist or is not pending.
    FriendRequestNotFound,
    /// The referenced friendship does not exist.
    FriendNotFound,
    /// No share exists for the presented token.
    ShareNotFound,
    /// The share exists but is revoked or past its expiry.
    ShareExpired,
    /// The caller is not authorized for the share's visibility.
    ShareAccessDenied,
    /// Too many resolution attempts against a share token.
    ShareRateLimitExceeded,
    /// Token generation exhausted its uniqueness retries.
    ShareCreationFailed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::AccessDenied => write!(f, "ACCESS_DENIED"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::FriendSelfRequest => write!(f, "FRIEND_SELF_REQUEST"),
            Self::FriendRequestAlreadySent => write!(f, "FRIEND_REQUEST_ALREADY_SENT"),
            Self::FriendAlreadyAdded => write!(f, "FRIEND_ALREADY_ADDED"),
            Self::FriendRequestNotFound => write!(f, "FRIEND_REQUEST_NOT_FOUND"),
            Self::FriendNotFound => write!(f, "FRIEND_NOT_FOUND"),
            Self::ShareNotFound => write!(f, "SHARE_NOT_FOUND"),
            Self::ShareExpired => write!(f, "SHARE_EXPIRED"),
            Self::ShareAccessDenied => write!(f, "SHARE_ACCESS_DENIED"),
            Self::ShareRateLimitExceeded => write!(f, "SHARE_RATE_LIMIT_EXCEEDED"),
            Self::ShareCreationFailed => write!(f, "SHARE_CREATION_FAILED"),
        }
    }
}

/// The unified application error used throughout Moneta.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an access-denied error.
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessDenied, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Returns true if this error is a uniqueness/concurrency conflict that
    /// a bounded retry loop may resolve.
    pub fn is_conflict(&self) -> bool {
        self.kind == ErrorKind::Conflict
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
