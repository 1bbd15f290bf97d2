//! User Password Value Object
//!
//! Delegates to `platform::password` for policy and Argon2id hashing.

use platform::password::{
    ClearTextPassword, HashedPassword, PasswordHashError, PasswordPolicyError,
};
use std::fmt;

use crate::error::{AccountError, AccountResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input, zeroized when dropped
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Normalize and validate
    ///
    /// 8..=128 characters after NFKC, no control characters, and at least one
    /// uppercase letter, lowercase letter, digit and symbol.
    pub fn new(raw: impl Into<String>) -> Result<Self, PasswordPolicyError> {
        ClearTextPassword::new(raw.into()).map(Self)
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Argon2id hash in PHC string format
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a validated raw password
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AccountResult<Self> {
        let hashed = raw.inner().hash(pepper).map_err(|e| match e {
            PasswordHashError::HashingFailed(msg) => {
                AccountError::Internal(format!("Password hashing failed: {}", msg))
            }
            PasswordHashError::InvalidHashFormat => {
                AccountError::Internal("Unexpected error during password hashing".to_string())
            }
        })?;

        Ok(Self(hashed))
    }

    /// Create from PHC string (from database)
    pub fn from_phc_string(phc_string: impl Into<String>) -> AccountResult<Self> {
        let hashed = HashedPassword::from_phc_string(phc_string)
            .map_err(|_| AccountError::Internal("Invalid password hash in database".to_string()))?;

        Ok(Self(hashed))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// `pepper` must match the one used during hashing
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }

    pub fn needs_rehash(&self) -> bool {
        self.0.needs_rehash()
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::{CharacterClass, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

    #[test]
    fn test_raw_password_validation() {
        assert!(RawPassword::new("ABCabc123_").is_ok());

        let short_pass = "Aa1_".repeat(MIN_PASSWORD_LENGTH / 4 - 1);
        assert!(matches!(
            RawPassword::new(short_pass),
            Err(PasswordPolicyError::TooShort { .. })
        ));

        let long_pass = "Aa1_".repeat(MAX_PASSWORD_LENGTH / 4 + 1);
        assert!(matches!(
            RawPassword::new(long_pass),
            Err(PasswordPolicyError::TooLong { .. })
        ));

        assert_eq!(
            RawPassword::new("password").unwrap_err(),
            PasswordPolicyError::MissingCharacterClass(CharacterClass::Uppercase)
        );

        assert!(RawPassword::new("").is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let raw = RawPassword::new("TestPassword123!").unwrap();
        let hashed = UserPassword::from_raw(&raw, None).unwrap();

        assert!(hashed.verify(&raw, None));

        let wrong = RawPassword::new("WrongPassword123!").unwrap();
        assert!(!hashed.verify(&wrong, None));
    }

    #[test]
    fn test_hash_with_pepper() {
        let raw = RawPassword::new("TestPassword123!").unwrap();
        let pepper = b"app_secret_pepper";
        let hashed = UserPassword::from_raw(&raw, Some(pepper)).unwrap();

        assert!(hashed.verify(&raw, Some(pepper)));
        assert!(!hashed.verify(&raw, None));
        assert!(!hashed.verify(&raw, Some(b"wrong")));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let raw = RawPassword::new("TestPassword123!").unwrap();
        let hashed = UserPassword::from_raw(&raw, None).unwrap();

        let restored = UserPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert_eq!(restored, hashed);
        assert!(restored.verify(&raw, None));
        assert!(!restored.needs_rehash());
    }

    #[test]
    fn test_invalid_phc_string() {
        let result = UserPassword::from_phc_string("plaintext");
        assert!(matches!(result, Err(AccountError::Internal(_))));
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("SecretPassword123!").unwrap();
        let debug = format!("{:?}", raw);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("Secret"));

        let hashed = UserPassword::from_raw(&raw, None).unwrap();
        let debug = format!("{:?}", hashed);
        assert!(debug.contains("HASH"));
        assert!(!debug.contains("argon2"));
    }
}
