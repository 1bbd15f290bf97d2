//! Account Error Types
//!
//! Account-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::application::validation::ValidationErrors;

/// Account-specific result type alias
pub type AccountResult<T> = Result<T, AccountError>;

#[derive(Debug, Error)]
pub enum AccountError {
    // ------------------------------------------------------------------
    // Validation (collected per field, never raised one by one)
    // ------------------------------------------------------------------
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    // ------------------------------------------------------------------
    // Uniqueness
    // ------------------------------------------------------------------
    #[error("Email address is already registered")]
    DuplicateEmail,

    #[error("One-time token is already in use")]
    DuplicateToken,

    // ------------------------------------------------------------------
    // Credentials
    // ------------------------------------------------------------------
    /// Token unknown, expired, or one-time password mismatch
    #[error("Invalid confirmation credential")]
    InvalidCredential,

    /// Unknown email, unverified account, or wrong password at sign-in
    #[error("Invalid email or password")]
    LoginFailed,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid redirect target")]
    InvalidRedirect,

    // ------------------------------------------------------------------
    // Account state preconditions
    // ------------------------------------------------------------------
    #[error("Account is not verified")]
    NotVerified,

    #[error("Account is temporarily locked")]
    AccountLocked,

    #[error("Account has been unsubscribed")]
    Unsubscribed,

    #[error("Login restriction cannot be applied")]
    RestrictionNotApplicable,

    #[error("Login restriction cannot be removed yet")]
    RestrictionNotRemovable,

    // ------------------------------------------------------------------
    // Infrastructure
    // ------------------------------------------------------------------
    /// Unit of work failed to apply or commit; nothing was written
    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data contradicts a domain invariant
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccountError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountError::Validation(_) => ErrorKind::UnprocessableEntity,
            AccountError::DuplicateEmail | AccountError::DuplicateToken => ErrorKind::Conflict,
            AccountError::InvalidCredential
            | AccountError::LoginFailed
            | AccountError::NotAuthenticated => ErrorKind::Unauthorized,
            AccountError::InvalidRedirect => ErrorKind::BadRequest,
            AccountError::NotVerified | AccountError::Unsubscribed => ErrorKind::Forbidden,
            AccountError::AccountLocked => ErrorKind::Locked,
            AccountError::RestrictionNotApplicable | AccountError::RestrictionNotRemovable => {
                ErrorKind::Conflict
            }
            AccountError::Transaction(_) | AccountError::Database(_) => {
                ErrorKind::ServiceUnavailable
            }
            AccountError::InvariantViolation(_) | AccountError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Storage failure the caller may retry
    pub fn is_transaction_error(&self) -> bool {
        matches!(self, AccountError::Transaction(_) | AccountError::Database(_))
    }

    /// Field-level messages, when this is a validation failure
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            AccountError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Convert to a user-safe AppError
    ///
    /// Storage and invariant details stay in the logs.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AccountError::InvalidCredential => {
                AppError::unauthorized("The confirmation code is invalid or has expired")
                    .with_action("Please request a new confirmation email")
            }
            AccountError::AccountLocked => AppError::locked(self.to_string())
                .with_action("Please try again later"),
            AccountError::Transaction(_) | AccountError::Database(_) => {
                AppError::service_unavailable("The request could not be completed")
                    .with_action("Please try again")
            }
            AccountError::InvariantViolation(_) | AccountError::Internal(_) => {
                AppError::internal("An unexpected error occurred")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AccountError::Database(e) => {
                tracing::error!(error = %e, "Account database error");
            }
            AccountError::Transaction(msg) => {
                tracing::error!(message = %msg, "Account transaction failed");
            }
            AccountError::InvariantViolation(msg) => {
                tracing::error!(message = %msg, "Account invariant violated");
            }
            AccountError::Internal(msg) => {
                tracing::error!(message = %msg, "Account internal error");
            }
            AccountError::InvalidCredential => {
                tracing::warn!("Invalid confirmation attempt");
            }
            AccountError::LoginFailed => {
                tracing::warn!("Invalid login attempt");
            }
            AccountError::AccountLocked => {
                tracing::warn!("Login attempt on locked account");
            }
            AccountError::RestrictionNotApplicable | AccountError::RestrictionNotRemovable => {
                tracing::error!(error = %self, "Login restriction precondition violated");
            }
            _ => {
                tracing::debug!(error = %self, "Account error");
            }
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        err.log();
        err.to_app_error()
    }
}
