//! Login Restriction Value Object
//!
//! Failed-login counter plus a temporary lock. Immutable: every transition
//! returns a new value that replaces the old one on the account.
//!
//! ```text
//! Unrestricted(n) --add_failed_login_count--> Unrestricted(n + 1)
//! Unrestricted(n >= 10) --enable(now)--> Restricted(n, now + 10min)
//! Restricted(_, t) --disable(now > t)--> Unrestricted(0)
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AccountError, AccountResult};

/// Failed logins after which the restriction may be applied
pub const FAILED_LOGIN_THRESHOLD: u32 = 10;

/// How long a restriction blocks logins
pub const LOCK_DURATION_MINUTES: i64 = 10;

// ============================================================================
// LoginRestrictionStatus
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum LoginRestrictionStatus {
    #[default]
    Unrestricted = 0,
    Restricted = 1,
}

impl LoginRestrictionStatus {
    /// Get numeric ID for database storage
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unrestricted => "unrestricted",
            Self::Restricted => "restricted",
        }
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Unrestricted),
            1 => Some(Self::Restricted),
            _ => None,
        }
    }
}

impl fmt::Display for LoginRestrictionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// LoginRestriction
// ============================================================================

/// Lockout state embedded in an account
///
/// `Restricted` always carries `next_login_allowed_at`, `Unrestricted` never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoginRestriction {
    failed_login_count: u32,
    status: LoginRestrictionStatus,
    next_login_allowed_at: Option<DateTime<Utc>>,
}

impl LoginRestriction {
    /// Fresh restriction for a new account
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from storage, rejecting rows that break the status/timestamp pairing
    pub fn reconstruct(
        failed_login_count: u32,
        status: LoginRestrictionStatus,
        next_login_allowed_at: Option<DateTime<Utc>>,
    ) -> AccountResult<Self> {
        match (status, next_login_allowed_at) {
            (LoginRestrictionStatus::Restricted, None) => Err(AccountError::InvariantViolation(
                "restricted login without next_login_allowed_at".to_string(),
            )),
            (LoginRestrictionStatus::Unrestricted, Some(_)) => {
                Err(AccountError::InvariantViolation(
                    "unrestricted login with next_login_allowed_at".to_string(),
                ))
            }
            _ => Ok(Self {
                failed_login_count,
                status,
                next_login_allowed_at,
            }),
        }
    }

    pub fn failed_login_count(&self) -> u32 {
        self.failed_login_count
    }

    pub fn status(&self) -> LoginRestrictionStatus {
        self.status
    }

    pub fn next_login_allowed_at(&self) -> Option<DateTime<Utc>> {
        self.next_login_allowed_at
    }

    pub fn is_restricted(&self) -> bool {
        self.status == LoginRestrictionStatus::Restricted
    }

    /// Count one more failed login; status is untouched
    #[must_use]
    pub fn add_failed_login_count(&self) -> Self {
        Self {
            failed_login_count: self.failed_login_count.saturating_add(1),
            ..*self
        }
    }

    /// Forget earlier failures; a restriction in force is kept as is
    #[must_use]
    pub fn reset_failed_login_count(&self) -> Self {
        if self.is_restricted() {
            return *self;
        }
        Self::new()
    }

    /// Threshold reached and not already restricted
    pub fn can_apply(&self) -> bool {
        self.failed_login_count >= FAILED_LOGIN_THRESHOLD && !self.is_restricted()
    }

    /// Restrict logins until `now + LOCK_DURATION_MINUTES`
    pub fn enable(&self, now: DateTime<Utc>) -> AccountResult<Self> {
        if !self.can_apply() {
            return Err(AccountError::RestrictionNotApplicable);
        }

        Ok(Self {
            failed_login_count: self.failed_login_count,
            status: LoginRestrictionStatus::Restricted,
            next_login_allowed_at: Some(now + Duration::minutes(LOCK_DURATION_MINUTES)),
        })
    }

    /// Restricted and the cooldown has strictly passed
    pub fn can_disable(&self, now: DateTime<Utc>) -> bool {
        match (self.status, self.next_login_allowed_at) {
            (LoginRestrictionStatus::Restricted, Some(next)) => now > next,
            _ => false,
        }
    }

    /// Lift the restriction and reset the counter
    pub fn disable(&self, now: DateTime<Utc>) -> AccountResult<Self> {
        if !self.can_disable(now) {
            return Err(AccountError::RestrictionNotRemovable);
        }

        Ok(Self::new())
    }
}
