//! Registration Confirmation Entity
//!
//! Pairs an account with a one-time token and password. The registrant
//! proves control of the email by presenting both before the token expires.

use chrono::{DateTime, Utc};

use crate::domain::service::UniqueToken;
use crate::domain::value_object::{
    one_time_password::OneTimePassword, one_time_token::OneTimeToken, user_id::UserId,
};

/// At most one per account; keyed by `user_id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationConfirmation {
    user_id: UserId,
    one_time_token: OneTimeToken,
    one_time_password: OneTimePassword,
}

impl RegistrationConfirmation {
    /// New confirmation with a freshly generated one-time password
    pub fn create(user_id: UserId, token: UniqueToken) -> Self {
        Self {
            user_id,
            one_time_token: token.into_inner(),
            one_time_password: OneTimePassword::generate(),
        }
    }

    pub fn reconstruct(
        user_id: UserId,
        one_time_token: OneTimeToken,
        one_time_password: OneTimePassword,
    ) -> Self {
        Self {
            user_id,
            one_time_token,
            one_time_password,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn one_time_token(&self) -> &OneTimeToken {
        &self.one_time_token
    }

    pub fn one_time_password(&self) -> &OneTimePassword {
        &self.one_time_password
    }

    /// Replace both credentials; the old pair stops working
    pub fn re_obtain(&mut self, token: UniqueToken) {
        self.one_time_token = token.into_inner();
        self.one_time_password = OneTimePassword::generate();
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.one_time_token.is_expired(now)
    }

    /// Not expired and the submitted password matches
    pub fn accepts(&self, submitted_password: &str, now: DateTime<Utc>) -> bool {
        // Always compare, expired or not
        let matches = self.one_time_password.matches(submitted_password);
        matches && !self.is_expired(now)
    }
}
