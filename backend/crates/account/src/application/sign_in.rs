//! Sign In Use Case
//!
//! Authenticates a verified account, tracks failed attempts and applies or
//! lifts the login restriction.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::AccountConfig;
use crate::domain::gateway::SessionAuthentication;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    email::UserEmail,
    user_id::UserId,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AccountError, AccountResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub user_id: UserId,
}

/// Sign in use case
pub struct SignInUseCase<R, S>
where
    R: AccountRepository,
    S: SessionAuthentication,
{
    account_repo: Arc<R>,
    session: Arc<S>,
    config: Arc<AccountConfig>,
}

impl<R, S> SignInUseCase<R, S>
where
    R: AccountRepository,
    S: SessionAuthentication,
{
    pub fn new(account_repo: Arc<R>, session: Arc<S>, config: Arc<AccountConfig>) -> Self {
        Self {
            account_repo,
            session,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AccountResult<SignInOutput> {
        self.execute_at(input, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        input: SignInInput,
        now: DateTime<Utc>,
    ) -> AccountResult<SignInOutput> {
        let email = UserEmail::new(&input.email).map_err(|_| AccountError::LoginFailed)?;

        let mut account = self
            .account_repo
            .find_by_email(&email)
            .await?
            .filter(|account| account.is_verified())
            .ok_or(AccountError::LoginFailed)?;

        let mut changed = false;
        if account.login_restriction().is_restricted() {
            if !account.can_unlocking(now) {
                tracing::warn!(user_id = %account.id(), "Sign in attempted while locked");
                return Err(AccountError::AccountLocked);
            }
            account.unlocking(now)?;
            changed = true;
        }

        // A password the policy rejects can never match a stored hash
        let password_valid = match RawPassword::new(input.password) {
            Ok(raw) => {
                let valid = account.password().verify(&raw, self.config.pepper());
                if valid && account.password().needs_rehash() {
                    let rehashed = UserPassword::from_raw(&raw, self.config.pepper())?;
                    account.change_password(rehashed, now)?;
                    changed = true;
                }
                valid
            }
            Err(_) => false,
        };

        if !password_valid {
            account.add_failed_login_count()?;
            let locked = account.can_locking();
            if locked {
                account.locking(now)?;
            }
            self.account_repo.save(&account).await?;

            if locked {
                tracing::warn!(
                    user_id = %account.id(),
                    next_login_allowed_at = ?account.login_restriction().next_login_allowed_at(),
                    "Account locked after repeated sign in failures"
                );
                return Err(AccountError::AccountLocked);
            }

            tracing::debug!(
                user_id = %account.id(),
                failed_login_count = account.login_restriction().failed_login_count(),
                "Sign in failed"
            );
            return Err(AccountError::LoginFailed);
        }

        // Successful sign in clears any failures below the threshold
        if account.login_restriction().failed_login_count() > 0 {
            account.reset_failed_login_count()?;
            changed = true;
        }
        if changed {
            self.account_repo.save(&account).await?;
        }

        self.session.mark_as_logged_in(*account.id()).await?;

        tracing::info!(user_id = %account.id(), "User signed in");

        Ok(SignInOutput {
            user_id: *account.id(),
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
    use crate::infra::in_memory::{InMemorySession, InMemoryStore};
    use chrono::Duration;

    struct Fixture {
        store: Arc<InMemoryStore>,
        session: Arc<InMemorySession>,
        user_id: UserId,
    }

    impl Fixture {
        fn use_case(&self) -> SignInUseCase<InMemoryStore, InMemorySession> {
            SignInUseCase::new(
                self.store.clone(),
                self.session.clone(),
                Arc::new(AccountConfig::default()),
            )
        }

        async fn stored(&self) -> AuthenticationAccount {
            self.store.stored_account(&self.user_id).await.unwrap()
        }
    }

    async fn fixture(verified: bool) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let mut account = new_account("test@example.com");
        if verified {
            account.update_verified();
        }
        AccountRepository::save(store.as_ref(), &account)
            .await
            .unwrap();
        Fixture {
            store,
            session: Arc::new(InMemorySession::new()),
            user_id: *account.id(),
        }
    }

    fn input(email: &str, password: &str) -> SignInInput {
        SignInInput {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    async fn fail_times(f: &Fixture, n: u32, now: DateTime<Utc>) -> AccountResult<SignInOutput> {
        let use_case = f.use_case();
        let mut last = Err(AccountError::LoginFailed);
        for _ in 0..n {
            last = use_case
                .execute_at(input("test@example.com", "WRONGwrong9!"), now)
                .await;
        }
        last
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let f = fixture(true).await;

        let output = f
            .use_case()
            .execute(input("test@example.com", "ABCabc123_"))
            .await
            .unwrap();

        assert_eq!(output.user_id, f.user_id);
        assert_eq!(f.session.current_user_id().await.unwrap(), Some(f.user_id));
    }

    #[tokio::test]
    async fn test_unknown_and_unverified_are_uniform() {
        let f = fixture(false).await;
        let use_case = f.use_case();

        let unverified = use_case
            .execute(input("test@example.com", "ABCabc123_"))
            .await
            .unwrap_err();
        let unknown = use_case
            .execute(input("nobody@example.com", "ABCabc123_"))
            .await
            .unwrap_err();
        let malformed = use_case
            .execute(input("not-an-email", "ABCabc123_"))
            .await
            .unwrap_err();

        for err in [&unverified, &unknown, &malformed] {
            assert!(matches!(err, AccountError::LoginFailed));
        }
        assert_eq!(f.session.current_user_id().await.unwrap(), None);
        // Unverified accounts do not accumulate failures
        assert_eq!(f.stored().await.login_restriction().failed_login_count(), 0);
    }

    #[tokio::test]
    async fn test_wrong_password_counts_failure() {
        let f = fixture(true).await;

        let err = fail_times(&f, 1, Utc::now()).await.unwrap_err();
        assert!(matches!(err, AccountError::LoginFailed));
        assert_eq!(f.stored().await.login_restriction().failed_login_count(), 1);

        // Policy-violating input is just a wrong password
        let err = f
            .use_case()
            .execute(input("test@example.com", "short"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::LoginFailed));
        assert_eq!(f.stored().await.login_restriction().failed_login_count(), 2);
    }

    #[tokio::test]
    async fn test_locks_at_threshold() {
        let f = fixture(true).await;
        let now = Utc::now();

        let err = fail_times(&f, FAILED_LOGIN_THRESHOLD - 1, now).await.unwrap_err();
        assert!(matches!(err, AccountError::LoginFailed));
        assert!(!f.stored().await.login_restriction().is_restricted());

        let err = fail_times(&f, 1, now).await.unwrap_err();
        assert!(matches!(err, AccountError::AccountLocked));
        let restriction = *f.stored().await.login_restriction();
        assert!(restriction.is_restricted());
        assert_eq!(
            restriction.next_login_allowed_at(),
            Some(now + Duration::minutes(LOCK_DURATION_MINUTES))
        );

        // Correct password is refused during the cooldown
        let err = f
            .use_case()
            .execute_at(
                input("test@example.com", "ABCabc123_"),
                now + Duration::minutes(1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::AccountLocked));
        assert_eq!(f.session.current_user_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unlocks_after_cooldown() {
        let f = fixture(true).await;
        let now = Utc::now();
        fail_times(&f, FAILED_LOGIN_THRESHOLD, now).await.unwrap_err();

        let later = now + Duration::minutes(LOCK_DURATION_MINUTES) + Duration::seconds(1);
        f.use_case()
            .execute_at(input("test@example.com", "ABCabc123_"), later)
            .await
            .unwrap();

        let restriction = *f.stored().await.login_restriction();
        assert!(!restriction.is_restricted());
        assert_eq!(restriction.failed_login_count(), 0);
        assert_eq!(f.session.current_user_id().await.unwrap(), Some(f.user_id));
    }

    #[tokio::test]
    async fn test_wrong_password_after_cooldown_starts_new_count() {
        let f = fixture(true).await;
        let now = Utc::now();
        fail_times(&f, FAILED_LOGIN_THRESHOLD, now).await.unwrap_err();

        let later = now + Duration::minutes(LOCK_DURATION_MINUTES) + Duration::seconds(1);
        let err = fail_times(&f, 1, later).await.unwrap_err();
        assert!(matches!(err, AccountError::LoginFailed));

        let restriction = *f.stored().await.login_restriction();
        assert!(!restriction.is_restricted());
        assert_eq!(restriction.failed_login_count(), 1);
    }

    #[tokio::test]
    async fn test_success_clears_failures() {
        let f = fixture(true).await;
        fail_times(&f, 3, Utc::now()).await.unwrap_err();

        f.use_case()
            .execute(input("test@example.com", "ABCabc123_"))
            .await
            .unwrap();
        assert_eq!(f.stored().await.login_restriction().failed_login_count(), 0);
    }
}
