//! Change Password Use Case
//!
//! Replaces the credential hash of the signed-in account and sends the
//! caller back to a registered client redirect.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::AccountConfig;
use crate::application::validation::{FIELD_PASSWORD, ValidationErrors};
use crate::domain::gateway::{ClientRedirectVerifier, SessionAuthentication};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AccountError, AccountResult};

/// Change password input
pub struct ChangePasswordInput {
    pub client_id: String,
    pub redirect_url: String,
    pub new_password: String,
}

/// Change password output
#[derive(Debug)]
pub struct ChangePasswordOutput {
    /// Validated redirect target
    pub redirect_url: String,
}

/// Change password use case
pub struct ChangePasswordUseCase<R, S, V>
where
    R: AccountRepository,
    S: SessionAuthentication,
    V: ClientRedirectVerifier,
{
    account_repo: Arc<R>,
    session: Arc<S>,
    redirect_verifier: Arc<V>,
    config: Arc<AccountConfig>,
}

impl<R, S, V> ChangePasswordUseCase<R, S, V>
where
    R: AccountRepository,
    S: SessionAuthentication,
    V: ClientRedirectVerifier,
{
    pub fn new(
        account_repo: Arc<R>,
        session: Arc<S>,
        redirect_verifier: Arc<V>,
        config: Arc<AccountConfig>,
    ) -> Self {
        Self {
            account_repo,
            session,
            redirect_verifier,
            config,
        }
    }

    pub async fn execute(&self, input: ChangePasswordInput) -> AccountResult<ChangePasswordOutput> {
        self.execute_at(input, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        input: ChangePasswordInput,
        now: DateTime<Utc>,
    ) -> AccountResult<ChangePasswordOutput> {
        if !self
            .redirect_verifier
            .is_valid_redirect(&input.client_id, &input.redirect_url)
            .await?
        {
            tracing::warn!(client_id = %input.client_id, "Unregistered redirect rejected");
            return Err(AccountError::InvalidRedirect);
        }

        let user_id = self
            .session
            .current_user_id()
            .await?
            .ok_or(AccountError::NotAuthenticated)?;

        let raw = RawPassword::new(input.new_password).map_err(|e| {
            let mut errors = ValidationErrors::new();
            errors.add(FIELD_PASSWORD, e.to_string());
            AccountError::Validation(errors)
        })?;

        let mut account = self
            .account_repo
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = %user_id, "Session refers to no active account");
                AccountError::NotAuthenticated
            })?;

        let password_hash = UserPassword::from_raw(&raw, self.config.pepper())?;
        account.change_password(password_hash, now)?;
        self.account_repo.save(&account).await?;

        tracing::info!(user_id = %user_id, "Password changed");

        Ok(ChangePasswordOutput {
            redirect_url: input.redirect_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::authentication_account::{
        AuthenticationAccount, tests::new_account,
    };
    use crate::domain::value_object::login_restriction::{
        FAILED_LOGIN_THRESHOLD, LOCK_DURATION_MINUTES,
    };
    use crate::domain::value_object::user_id::UserId;
    use crate::infra::in_memory::{InMemoryClientRegistry, InMemorySession, InMemoryStore};
    use chrono::Duration;

    const CLIENT: &str = "web";
    const REDIRECT: &str = "https://example.com/settings";
    const NEW_PASSWORD: &str = "NEWnew456!";

    type UseCase = ChangePasswordUseCase<InMemoryStore, InMemorySession, InMemoryClientRegistry>;

    async fn store_with(account: &AuthenticationAccount) -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        AccountRepository::save(store.as_ref(), account)
            .await
            .unwrap();
        store
    }

    fn use_case(store: &Arc<InMemoryStore>, session: InMemorySession) -> UseCase {
        ChangePasswordUseCase::new(
            store.clone(),
            Arc::new(session),
            Arc::new(InMemoryClientRegistry::new().with_redirect(CLIENT, REDIRECT)),
            Arc::new(AccountConfig::default()),
        )
    }

    fn input(redirect_url: &str, new_password: &str) -> ChangePasswordInput {
        ChangePasswordInput {
            client_id: CLIENT.to_string(),
            redirect_url: redirect_url.to_string(),
            new_password: new_password.to_string(),
        }
    }

    fn verified_account() -> AuthenticationAccount {
        let mut account = new_account("test@example.com");
        account.update_verified();
        account
    }

    fn new_password_matches(account: &AuthenticationAccount) -> bool {
        account
            .password()
            .verify(&RawPassword::new(NEW_PASSWORD).unwrap(), None)
    }

    #[tokio::test]
    async fn test_change_password_success() {
        let account = verified_account();
        let store = store_with(&account).await;

        let output = use_case(&store, InMemorySession::logged_in_as(*account.id()))
            .execute(input(REDIRECT, NEW_PASSWORD))
            .await
            .unwrap();

        assert_eq!(output.redirect_url, REDIRECT);
        let stored = store.stored_account(account.id()).await.unwrap();
        assert!(new_password_matches(&stored));
    }

    #[tokio::test]
    async fn test_locked_account_is_rejected() {
        let now = Utc::now();
        let mut account = verified_account();
        for _ in 0..FAILED_LOGIN_THRESHOLD {
            account.add_failed_login_count().unwrap();
        }
        account.locking(now).unwrap();
        let store = store_with(&account).await;

        let err = use_case(&store, InMemorySession::logged_in_as(*account.id()))
            .execute_at(input(REDIRECT, NEW_PASSWORD), now + Duration::minutes(1))
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::AccountLocked));
        assert!(!new_password_matches(
            &store.stored_account(account.id()).await.unwrap()
        ));

        // Allowed again once the cooldown has passed
        use_case(&store, InMemorySession::logged_in_as(*account.id()))
            .execute_at(
                input(REDIRECT, NEW_PASSWORD),
                now + Duration::minutes(LOCK_DURATION_MINUTES + 1),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unverified_account_is_rejected() {
        let account = new_account("test@example.com");
        let store = store_with(&account).await;

        let err = use_case(&store, InMemorySession::logged_in_as(*account.id()))
            .execute(input(REDIRECT, NEW_PASSWORD))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::NotVerified));
    }

    #[tokio::test]
    async fn test_redirect_checked_first() {
        let store = Arc::new(InMemoryStore::new());

        let err = use_case(&store, InMemorySession::new())
            .execute(input("https://evil.example.com/", "short"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidRedirect));
    }

    #[tokio::test]
    async fn test_requires_session() {
        let account = verified_account();
        let store = store_with(&account).await;

        let err = use_case(&store, InMemorySession::new())
            .execute(input(REDIRECT, NEW_PASSWORD))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::NotAuthenticated));

        let err = use_case(&store, InMemorySession::logged_in_as(UserId::new()))
            .execute(input(REDIRECT, NEW_PASSWORD))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_weak_password_is_validation_error() {
        let account = verified_account();
        let store = store_with(&account).await;

        let err = use_case(&store, InMemorySession::logged_in_as(*account.id()))
            .execute(input(REDIRECT, "password"))
            .await
            .unwrap_err();

        let errors = err.validation_errors().unwrap();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![FIELD_PASSWORD]);
    }
}
