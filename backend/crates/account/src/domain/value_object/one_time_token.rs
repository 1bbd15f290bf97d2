//! One-Time Token Value Object
//!
//! Opaque random string identifying a pending registration confirmation.
//! Travels inside the confirmation URL, so it stays URL-safe (`[A-Za-z0-9]`).

use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Token length in characters
pub const ONE_TIME_TOKEN_LENGTH: usize = 26;

/// How long a freshly issued token stays valid
pub const ONE_TIME_TOKEN_VALIDITY_HOURS: i64 = 24;

// ============================================================================
// OneTimeTokenValue
// ============================================================================

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OneTimeTokenValue(String);

impl OneTimeTokenValue {
    pub fn generate() -> Self {
        Self(platform::crypto::random_alphanumeric(ONE_TIME_TOKEN_LENGTH))
    }

    /// Wrap a stored or submitted value; lookups decide whether it exists
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OneTimeTokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OneTimeTokenValue")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// OneTimeToken
// ============================================================================

/// Token value with its expiration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeToken {
    value: OneTimeTokenValue,
    expiration: DateTime<Utc>,
}

impl OneTimeToken {
    /// Issue a new random token valid for [`ONE_TIME_TOKEN_VALIDITY_HOURS`]
    pub fn create(now: DateTime<Utc>) -> Self {
        Self {
            value: OneTimeTokenValue::generate(),
            expiration: now + Duration::hours(ONE_TIME_TOKEN_VALIDITY_HOURS),
        }
    }

    pub fn reconstruct(value: OneTimeTokenValue, expiration: DateTime<Utc>) -> Self {
        Self { value, expiration }
    }

    pub fn value(&self) -> &OneTimeTokenValue {
        &self.value
    }

    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_value_shape() {
        let value = OneTimeTokenValue::generate();
        assert_eq!(value.as_str().len(), ONE_TIME_TOKEN_LENGTH);
        assert!(value.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(value, OneTimeTokenValue::generate());
    }

    #[test]
    fn test_create_sets_expiration() {
        let now = Utc::now();
        let token = OneTimeToken::create(now);
        assert_eq!(
            token.expiration(),
            now + Duration::hours(ONE_TIME_TOKEN_VALIDITY_HOURS)
        );
    }

    #[test]
    fn test_is_expired_boundary() {
        let now = Utc::now();
        let token = OneTimeToken::reconstruct(OneTimeTokenValue::generate(), now);

        assert!(!token.is_expired(now - Duration::seconds(1)));
        assert!(token.is_expired(now));
        assert!(token.is_expired(now + Duration::seconds(1)));
    }

    #[test]
    fn test_debug_redaction() {
        let value = OneTimeTokenValue::from_db("abcdefghijklmnopqrstuvwxyz");
        let debug = format!("{:?}", value);
        assert!(!debug.contains("abcdef"));
    }
}
