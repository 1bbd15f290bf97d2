//! Account Status Value Objects
//!
//! Two independent axes of an account:
//! - **VerificationStatus**: whether the registrant has proven control of the email
//! - **UnsubscribeStatus**: whether the account has left the service
//!
//! Lockout is the third axis and lives in `LoginRestriction`.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// VerificationStatus
// ============================================================================

/// Registration confirmation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum VerificationStatus {
    /// Provisionally registered, confirmation pending
    #[default]
    Unverified = 0,

    /// Confirmation completed
    Verified = 1,
}

impl VerificationStatus {
    /// Get numeric ID for database storage
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Verified => "verified",
        }
    }

    #[inline]
    pub const fn is_verified(&self) -> bool {
        matches!(self, Self::Verified)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Unverified),
            1 => Some(Self::Verified),
            _ => None,
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "unverified" => Some(Self::Unverified),
            "verified" => Some(Self::Verified),
            _ => None,
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ============================================================================
// UnsubscribeStatus
// ============================================================================

/// Membership state
///
/// Unsubscribed rows are kept for history but never rehydrated as accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum UnsubscribeStatus {
    #[default]
    Subscribed = 0,

    Unsubscribed = 1,
}

impl UnsubscribeStatus {
    /// Get numeric ID for database storage
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Subscribed => "subscribed",
            Self::Unsubscribed => "unsubscribed",
        }
    }

    #[inline]
    pub const fn is_unsubscribed(&self) -> bool {
        matches!(self, Self::Unsubscribed)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Subscribed),
            1 => Some(Self::Unsubscribed),
            _ => None,
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "subscribed" => Some(Self::Subscribed),
            "unsubscribed" => Some(Self::Unsubscribed),
            _ => None,
        }
    }
}

impl fmt::Display for UnsubscribeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
