//! User Name Value Object
//!
//! Display name shown for the account. Starts out as the email's local part.

use std::fmt;
use thiserror::Error;

use crate::domain::value_object::email::UserEmail;

/// Maximum length in characters
pub const USER_NAME_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("Name must be 1 to {max} characters")]
    InvalidLength { max: usize },

    #[error("Name cannot be blank")]
    Blank,
}

/// Kept as entered; surrounding whitespace is not stripped
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserName(String);

impl UserName {
    pub fn new(name: impl Into<String>) -> Result<Self, UserNameError> {
        let name = name.into();

        let length = name.chars().count();
        if length == 0 || length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::InvalidLength {
                max: USER_NAME_MAX_LENGTH,
            });
        }

        if name.chars().all(char::is_whitespace) {
            return Err(UserNameError::Blank);
        }

        Ok(Self(name))
    }

    /// Initial name for a new account, cut to the maximum length
    pub fn initial(email: &UserEmail) -> Self {
        Self(
            email
                .local_part()
                .chars()
                .take(USER_NAME_MAX_LENGTH)
                .collect(),
        )
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
