//! In-Memory Implementations
//!
//! Same contracts as the PostgreSQL adapter, including storage-level
//! uniqueness and all-or-nothing unit of work. Used by tests and local runs.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::entity::{
    authentication_account::AuthenticationAccount,
    registration_confirmation::RegistrationConfirmation,
};
use crate::domain::gateway::{ClientRedirectVerifier, SessionAuthentication};
use crate::domain::repository::{
    AccountRepository, ConfirmationRepository, PendingWrite, UnitOfWork, WriteSet,
};
use crate::domain::value_object::{
    email::UserEmail, one_time_token::OneTimeTokenValue, user_id::UserId,
};
use crate::error::{AccountError, AccountResult};

// ============================================================================
// Store
// ============================================================================

#[derive(Debug, Clone, Default)]
struct State {
    accounts: HashMap<UserId, AuthenticationAccount>,
    confirmations: HashMap<UserId, RegistrationConfirmation>,
}

impl State {
    fn apply(&mut self, write: PendingWrite) -> AccountResult<()> {
        match write {
            PendingWrite::SaveAccount(account) => self.put_account(account),
            PendingWrite::SaveConfirmation(confirmation) => self.put_confirmation(confirmation),
            PendingWrite::DeleteConfirmation(user_id) => {
                self.confirmations.remove(&user_id);
                Ok(())
            }
        }
    }

    fn put_account(&mut self, account: AuthenticationAccount) -> AccountResult<()> {
        if !account.unsubscribe_status().is_unsubscribed() {
            let taken = self.accounts.values().any(|other| {
                other.id() != account.id()
                    && !other.unsubscribe_status().is_unsubscribed()
                    && other.email() == account.email()
            });
            if taken {
                return Err(AccountError::Transaction(
                    "unique violation: accounts.email".to_string(),
                ));
            }
        }
        self.accounts.insert(*account.id(), account);
        Ok(())
    }

    fn put_confirmation(&mut self, confirmation: RegistrationConfirmation) -> AccountResult<()> {
        if !self.accounts.contains_key(confirmation.user_id()) {
            return Err(AccountError::Transaction(
                "foreign key violation: registration_confirmations.user_id".to_string(),
            ));
        }
        let token = confirmation.one_time_token().value();
        let taken = self.confirmations.values().any(|other| {
            other.user_id() != confirmation.user_id() && other.one_time_token().value() == token
        });
        if taken {
            return Err(AccountError::Transaction(
                "unique violation: registration_confirmations.one_time_token_value".to_string(),
            ));
        }
        self.confirmations
            .insert(*confirmation.user_id(), confirmation);
        Ok(())
    }

    fn subscribed(&self, account: &AuthenticationAccount) -> bool {
        !account.unsubscribe_status().is_unsubscribed()
    }
}

/// Accounts and confirmations behind one lock
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    fail_next_commit: AtomicBool,
    commits: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next unit of work fail at commit time
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Number of committed units of work
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub async fn account_count(&self) -> usize {
        self.state.lock().await.accounts.len()
    }

    pub async fn confirmation_count(&self) -> usize {
        self.state.lock().await.confirmations.len()
    }

    /// Raw account lookup, unsubscribed included
    pub async fn stored_account(&self, user_id: &UserId) -> Option<AuthenticationAccount> {
        self.state.lock().await.accounts.get(user_id).cloned()
    }

    /// Same sweep as `PgAccountRepository::cleanup_expired_confirmations`
    pub async fn cleanup_expired_confirmations(&self, now: DateTime<Utc>) -> usize {
        let mut state = self.state.lock().await;
        let before = state.confirmations.len();
        state.confirmations.retain(|_, c| !c.is_expired(now));
        before - state.confirmations.len()
    }
}

impl AccountRepository for InMemoryStore {
    fn next_user_id(&self) -> UserId {
        UserId::new()
    }

    async fn find_by_id(&self, user_id: &UserId) -> AccountResult<Option<AuthenticationAccount>> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .get(user_id)
            .filter(|account| state.subscribed(account))
            .cloned())
    }

    async fn find_by_email(
        &self,
        email: &UserEmail,
    ) -> AccountResult<Option<AuthenticationAccount>> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .find(|account| state.subscribed(account) && account.email() == email)
            .cloned())
    }

    async fn save(&self, account: &AuthenticationAccount) -> AccountResult<()> {
        self.state.lock().await.put_account(account.clone())
    }
}

impl ConfirmationRepository for InMemoryStore {
    async fn find_by_token_value(
        &self,
        token: &OneTimeTokenValue,
    ) -> AccountResult<Option<RegistrationConfirmation>> {
        let state = self.state.lock().await;
        Ok(state
            .confirmations
            .values()
            .find(|c| c.one_time_token().value() == token)
            .cloned())
    }

    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> AccountResult<Option<RegistrationConfirmation>> {
        Ok(self.state.lock().await.confirmations.get(user_id).cloned())
    }

    async fn save(&self, confirmation: &RegistrationConfirmation) -> AccountResult<()> {
        self.state
            .lock()
            .await
            .put_confirmation(confirmation.clone())
    }

    async fn delete(&self, user_id: &UserId) -> AccountResult<()> {
        self.state.lock().await.confirmations.remove(user_id);
        Ok(())
    }
}

impl UnitOfWork for InMemoryStore {
    async fn perform_transaction<F>(&self, work: F) -> AccountResult<()>
    where
        F: FnOnce(&mut WriteSet) -> AccountResult<()> + Send,
    {
        let write_set = WriteSet::record(work)?;

        let mut state = self.state.lock().await;

        // Apply to a copy; swap in only when every write succeeded
        let mut staged = state.clone();
        for write in write_set.into_writes() {
            staged.apply(write)?;
        }

        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(AccountError::Transaction(
                "commit failed (injected)".to_string(),
            ));
        }

        *state = staged;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Session
// ============================================================================

/// Single-caller login session
#[derive(Debug, Default)]
pub struct InMemorySession {
    user_id: Mutex<Option<UserId>>,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logged_in_as(user_id: UserId) -> Self {
        Self {
            user_id: Mutex::new(Some(user_id)),
        }
    }
}

impl SessionAuthentication for InMemorySession {
    async fn mark_as_logged_in(&self, user_id: UserId) -> AccountResult<()> {
        *self.user_id.lock().await = Some(user_id);
        Ok(())
    }

    async fn current_user_id(&self) -> AccountResult<Option<UserId>> {
        Ok(*self.user_id.lock().await)
    }

    async fn logout(&self) -> AccountResult<()> {
        *self.user_id.lock().await = None;
        Ok(())
    }
}

// ============================================================================
// Client registry
// ============================================================================

/// Registered `(client_id, redirect_url)` pairs
#[derive(Debug, Default)]
pub struct InMemoryClientRegistry {
    redirects: HashSet<(String, String)>,
}

impl InMemoryClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_redirect(mut self, client_id: &str, redirect_url: &str) -> Self {
        self.redirects
            .insert((client_id.to_string(), redirect_url.to_string()));
        self
    }
}

impl ClientRedirectVerifier for InMemoryClientRegistry {
    async fn is_valid_redirect(&self, client_id: &str, redirect_url: &str) -> AccountResult<bool> {
        Ok(self
            .redirects
            .contains(&(client_id.to_string(), redirect_url.to_string())))
    }
}
