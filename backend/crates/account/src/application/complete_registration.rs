//! Complete Registration Use Case
//!
//! Checks a submitted token and one-time password, verifies the account and
//! consumes the confirmation in one transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::repository::{AccountRepository, ConfirmationRepository, UnitOfWork};
use crate::domain::value_object::{
    one_time_password::OneTimePassword, one_time_token::OneTimeTokenValue,
};
use crate::error::{AccountError, AccountResult};

/// Complete registration input
pub struct CompleteRegistrationInput {
    pub one_time_token: String,
    pub one_time_password: String,
}

/// Complete registration use case
pub struct CompleteRegistrationUseCase<R, C, W>
where
    R: AccountRepository,
    C: ConfirmationRepository,
    W: UnitOfWork,
{
    account_repo: Arc<R>,
    confirmation_repo: Arc<C>,
    unit_of_work: Arc<W>,
}

impl<R, C, W> CompleteRegistrationUseCase<R, C, W>
where
    R: AccountRepository,
    C: ConfirmationRepository,
    W: UnitOfWork,
{
    pub fn new(account_repo: Arc<R>, confirmation_repo: Arc<C>, unit_of_work: Arc<W>) -> Self {
        Self {
            account_repo,
            confirmation_repo,
            unit_of_work,
        }
    }

    pub async fn execute(&self, input: CompleteRegistrationInput) -> AccountResult<()> {
        self.execute_at(input, Utc::now()).await
    }

    /// Unknown token, expired token and wrong password all fail with
    /// `InvalidCredential`
    pub async fn execute_at(
        &self,
        input: CompleteRegistrationInput,
        now: DateTime<Utc>,
    ) -> AccountResult<()> {
        let token = OneTimeTokenValue::from_db(input.one_time_token.trim());
        let found = self.confirmation_repo.find_by_token_value(&token).await?;
        let accepted = match &found {
            Some(confirmation) => confirmation.accepts(&input.one_time_password, now),
            None => OneTimePassword::reject(&input.one_time_password),
        };
        let confirmation = found
            .filter(|_| accepted)
            .ok_or_else(|| {
                tracing::warn!("Registration confirmation rejected");
                AccountError::InvalidCredential
            })?;

        let user_id = *confirmation.user_id();
        let mut account = self
            .account_repo
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| {
                let err = AccountError::InvariantViolation(format!(
                    "registration confirmation for {} has no account",
                    user_id
                ));
                err.log();
                err
            })?;

        account.update_verified();

        self.unit_of_work
            .perform_transaction(|tx| {
                tx.save_account(&account);
                tx.delete_confirmation(&user_id);
                Ok(())
            })
            .await?;

        tracing::info!(user_id = %user_id, "Account verified");

        Ok(())
    }
}
