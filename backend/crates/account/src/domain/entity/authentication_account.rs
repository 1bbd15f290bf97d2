//! Authentication Account Entity
//!
//! Aggregate root for sign-in identity. Three independent axes:
//! verification, subscription and login restriction.

use chrono::{DateTime, Utc};

use crate::domain::service::UniqueEmail;
use crate::domain::value_object::{
    account_status::{UnsubscribeStatus, VerificationStatus},
    email::UserEmail,
    login_restriction::LoginRestriction,
    user_id::UserId,
    user_name::UserName,
    user_password::UserPassword,
};
use crate::error::{AccountError, AccountResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationAccount {
    id: UserId,
    email: UserEmail,
    name: UserName,
    password: UserPassword,
    verification_status: VerificationStatus,
    unsubscribe_status: UnsubscribeStatus,
    login_restriction: LoginRestriction,
}

impl AuthenticationAccount {
    /// New provisional account: unverified, subscribed, unrestricted
    pub fn create(id: UserId, email: UniqueEmail, password: UserPassword) -> Self {
        let email = email.into_inner();
        Self {
            id,
            name: UserName::initial(&email),
            email,
            password,
            verification_status: VerificationStatus::Unverified,
            unsubscribe_status: UnsubscribeStatus::Subscribed,
            login_restriction: LoginRestriction::new(),
        }
    }

    /// Rehydrate from storage
    ///
    /// Unsubscribed accounts are not usable and fail with `Unsubscribed`.
    pub fn reconstruct(
        id: UserId,
        email: UserEmail,
        name: UserName,
        password: UserPassword,
        verification_status: VerificationStatus,
        unsubscribe_status: UnsubscribeStatus,
        login_restriction: LoginRestriction,
    ) -> AccountResult<Self> {
        if unsubscribe_status.is_unsubscribed() {
            return Err(AccountError::Unsubscribed);
        }

        Ok(Self {
            id,
            email,
            name,
            password,
            verification_status,
            unsubscribe_status,
            login_restriction,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &UserEmail {
        &self.email
    }

    pub fn name(&self) -> &UserName {
        &self.name
    }

    pub fn password(&self) -> &UserPassword {
        &self.password
    }

    pub fn verification_status(&self) -> VerificationStatus {
        self.verification_status
    }

    pub fn unsubscribe_status(&self) -> UnsubscribeStatus {
        self.unsubscribe_status
    }

    pub fn login_restriction(&self) -> &LoginRestriction {
        &self.login_restriction
    }

    pub fn is_verified(&self) -> bool {
        self.verification_status.is_verified()
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Only the confirmation workflow calls this, after checking the credential
    pub fn update_verified(&mut self) {
        self.verification_status = VerificationStatus::Verified;
    }

    pub fn update_unsubscribed(&mut self) {
        self.unsubscribe_status = UnsubscribeStatus::Unsubscribed;
    }

    pub fn change_name(&mut self, name: UserName) -> AccountResult<()> {
        self.ensure_verified()?;
        self.name = name;
        Ok(())
    }

    pub fn change_password(&mut self, password: UserPassword, now: DateTime<Utc>) -> AccountResult<()> {
        self.ensure_verified()?;
        if !self.can_logged_in(now) {
            return Err(AccountError::AccountLocked);
        }
        self.password = password;
        Ok(())
    }

    pub fn add_failed_login_count(&mut self) -> AccountResult<()> {
        self.ensure_verified()?;
        self.login_restriction = self.login_restriction.add_failed_login_count();
        Ok(())
    }

    pub fn reset_failed_login_count(&mut self) -> AccountResult<()> {
        self.ensure_verified()?;
        self.login_restriction = self.login_restriction.reset_failed_login_count();
        Ok(())
    }

    /// Apply the login restriction; fails unless `can_locking()`
    pub fn locking(&mut self, now: DateTime<Utc>) -> AccountResult<()> {
        self.ensure_verified()?;
        self.login_restriction = self.login_restriction.enable(now)?;
        Ok(())
    }

    /// Lift the login restriction; fails unless `can_unlocking(now)`
    pub fn unlocking(&mut self, now: DateTime<Utc>) -> AccountResult<()> {
        self.ensure_verified()?;
        self.login_restriction = self.login_restriction.disable(now)?;
        Ok(())
    }

    // ========================================================================
    // Predicates
    // ========================================================================

    /// Verified, and either unrestricted or past the cooldown
    pub fn can_logged_in(&self, now: DateTime<Utc>) -> bool {
        if !self.is_verified() {
            return false;
        }
        if !self.login_restriction.is_restricted() {
            return true;
        }
        self.can_unlocking(now)
    }

    pub fn can_unlocking(&self, now: DateTime<Utc>) -> bool {
        self.login_restriction.can_disable(now)
    }

    pub fn can_locking(&self) -> bool {
        self.login_restriction.can_apply()
    }

    fn ensure_verified(&self) -> AccountResult<()> {
        if self.is_verified() {
            Ok(())
        } else {
            Err(AccountError::NotVerified)
        }
    }
}
