//! One-Time Password Value Object
//!
//! Short numeric secret delivered by email alongside the token.

use platform::crypto::{constant_time_eq, random_digits};
use std::fmt;

use crate::error::{AccountError, AccountResult};

/// Number of digits
pub const ONE_TIME_PASSWORD_LENGTH: usize = 6;

const DECOY: &str = "000000";

#[derive(Clone, PartialEq, Eq)]
pub struct OneTimePassword(String);

impl OneTimePassword {
    pub fn generate() -> Self {
        Self(random_digits(ONE_TIME_PASSWORD_LENGTH))
    }

    /// Rehydrate from storage
    pub fn reconstruct(value: impl Into<String>) -> AccountResult<Self> {
        let value = value.into();
        if value.len() != ONE_TIME_PASSWORD_LENGTH || !value.chars().all(|c| c.is_ascii_digit()) {
            return Err(AccountError::InvariantViolation(
                "stored one-time password is malformed".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time comparison against a submitted value
    pub fn matches(&self, submitted: &str) -> bool {
        constant_time_eq(self.0.as_bytes(), submitted.trim().as_bytes())
    }

    /// Pays the cost of `matches` when there is nothing to compare against.
    /// Always false.
    pub fn reject(submitted: &str) -> bool {
        let _ = std::hint::black_box(constant_time_eq(
            DECOY.as_bytes(),
            submitted.trim().as_bytes(),
        ));
        false
    }
}

impl fmt::Debug for OneTimePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OneTimePassword")
            .field(&"[REDACTED]")
            .finish()
    }
}
