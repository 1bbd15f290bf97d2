//! Domain Services
//!
//! Uniqueness checks that need a repository. Each returns a proof type that
//! only this module can build, and the aggregates' constructors require it.

use crate::domain::repository::{AccountRepository, ConfirmationRepository};
use crate::domain::value_object::{email::UserEmail, one_time_token::OneTimeToken};
use crate::error::{AccountError, AccountResult};

/// An email not bound to any subscribed account at check time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueEmail(UserEmail);

impl UniqueEmail {
    pub fn as_email(&self) -> &UserEmail {
        &self.0
    }

    pub fn into_inner(self) -> UserEmail {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn assume_unique(email: UserEmail) -> Self {
        Self(email)
    }
}

/// A token whose value no stored confirmation uses at check time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueToken(OneTimeToken);

impl UniqueToken {
    pub fn as_token(&self) -> &OneTimeToken {
        &self.0
    }

    pub fn into_inner(self) -> OneTimeToken {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn assume_unique(token: OneTimeToken) -> Self {
        Self(token)
    }
}

/// Fails with `DuplicateEmail` when a subscribed account already owns `email`
pub async fn ensure_unique_email<R>(repo: &R, email: UserEmail) -> AccountResult<UniqueEmail>
where
    R: AccountRepository,
{
    if repo.find_by_email(&email).await?.is_some() {
        return Err(AccountError::DuplicateEmail);
    }
    Ok(UniqueEmail(email))
}

/// Fails with `DuplicateToken` when a stored confirmation already uses the value
pub async fn ensure_unique_token<C>(repo: &C, token: OneTimeToken) -> AccountResult<UniqueToken>
where
    C: ConfirmationRepository,
{
    if repo.find_by_token_value(token.value()).await?.is_some() {
        return Err(AccountError::DuplicateToken);
    }
    Ok(UniqueToken(token))
}
