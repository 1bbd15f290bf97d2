//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//! Implementations must enforce email and token uniqueness at the storage
//! layer; the checks in `domain::service` only fail fast.

use crate::domain::entity::{
    authentication_account::AuthenticationAccount,
    registration_confirmation::RegistrationConfirmation,
};
use crate::domain::value_object::{
    email::UserEmail, one_time_token::OneTimeTokenValue, user_id::UserId,
};
use crate::error::{AccountError, AccountResult};

/// Authentication account repository trait
///
/// Only subscribed accounts are ever returned.
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Allocate an identifier for a new account
    fn next_user_id(&self) -> UserId;

    async fn find_by_id(&self, user_id: &UserId) -> AccountResult<Option<AuthenticationAccount>>;

    async fn find_by_email(&self, email: &UserEmail)
    -> AccountResult<Option<AuthenticationAccount>>;

    /// Insert or update
    async fn save(&self, account: &AuthenticationAccount) -> AccountResult<()>;
}

/// Registration confirmation repository trait
#[trait_variant::make(ConfirmationRepository: Send)]
pub trait LocalConfirmationRepository {
    async fn find_by_token_value(
        &self,
        token: &OneTimeTokenValue,
    ) -> AccountResult<Option<RegistrationConfirmation>>;

    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> AccountResult<Option<RegistrationConfirmation>>;

    /// Insert or replace the confirmation of `confirmation.user_id()`
    async fn save(&self, confirmation: &RegistrationConfirmation) -> AccountResult<()>;

    async fn delete(&self, user_id: &UserId) -> AccountResult<()>;
}

// ============================================================================
// Unit of Work
// ============================================================================

/// A write staged inside a unit of work
#[derive(Debug, Clone)]
pub enum PendingWrite {
    SaveAccount(AuthenticationAccount),
    SaveConfirmation(RegistrationConfirmation),
    DeleteConfirmation(UserId),
}

/// Writes collected by a transaction closure, applied in order on commit
#[derive(Debug, Default)]
pub struct WriteSet {
    writes: Vec<PendingWrite>,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` against an empty set; its failure becomes a transaction error
    pub fn record<F>(work: F) -> AccountResult<Self>
    where
        F: FnOnce(&mut WriteSet) -> AccountResult<()>,
    {
        let mut write_set = Self::new();
        match work(&mut write_set) {
            Ok(()) => Ok(write_set),
            Err(e) if e.is_transaction_error() => Err(e),
            Err(e) => Err(AccountError::Transaction(format!(
                "unit of work aborted: {}",
                e
            ))),
        }
    }

    pub fn save_account(&mut self, account: &AuthenticationAccount) {
        self.writes.push(PendingWrite::SaveAccount(account.clone()));
    }

    pub fn save_confirmation(&mut self, confirmation: &RegistrationConfirmation) {
        self.writes
            .push(PendingWrite::SaveConfirmation(confirmation.clone()));
    }

    pub fn delete_confirmation(&mut self, user_id: &UserId) {
        self.writes.push(PendingWrite::DeleteConfirmation(*user_id));
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn into_writes(self) -> Vec<PendingWrite> {
        self.writes
    }
}

/// Transaction boundary spanning both aggregates
///
/// `work` stages writes into a [`WriteSet`]. They become visible all together
/// or not at all. A failing closure or commit yields `AccountError::Transaction`
/// and nothing is written.
#[trait_variant::make(UnitOfWork: Send)]
pub trait LocalUnitOfWork {
    async fn perform_transaction<F>(&self, work: F) -> AccountResult<()>
    where
        F: FnOnce(&mut WriteSet) -> AccountResult<()> + Send;
}
