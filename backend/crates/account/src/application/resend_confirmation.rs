//! Resend Confirmation Use Case
//!
//! Issues a fresh token and one-time password for a pending registration,
//! recreating the confirmation if the expiry sweep already removed it.
//! The outcome never reveals whether the email is registered.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::AccountConfig;
use crate::application::register::send_confirmation_email;
use crate::application::validation::{FIELD_EMAIL, ValidationErrors};
use crate::domain::entity::registration_confirmation::RegistrationConfirmation;
use crate::domain::gateway::EmailSender;
use crate::domain::repository::{AccountRepository, ConfirmationRepository};
use crate::domain::service::ensure_unique_token;
use crate::domain::value_object::{email::UserEmail, one_time_token::OneTimeToken};
use crate::error::{AccountError, AccountResult};

/// Resend confirmation input
pub struct ResendConfirmationInput {
    pub email: String,
}

/// Resend confirmation use case
pub struct ResendConfirmationUseCase<R, C, E>
where
    R: AccountRepository,
    C: ConfirmationRepository,
    E: EmailSender,
{
    account_repo: Arc<R>,
    confirmation_repo: Arc<C>,
    email_sender: Arc<E>,
    config: Arc<AccountConfig>,
}

impl<R, C, E> ResendConfirmationUseCase<R, C, E>
where
    R: AccountRepository,
    C: ConfirmationRepository,
    E: EmailSender,
{
    pub fn new(
        account_repo: Arc<R>,
        confirmation_repo: Arc<C>,
        email_sender: Arc<E>,
        config: Arc<AccountConfig>,
    ) -> Self {
        Self {
            account_repo,
            confirmation_repo,
            email_sender,
            config,
        }
    }

    pub async fn execute(&self, input: ResendConfirmationInput) -> AccountResult<()> {
        self.execute_at(input, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        input: ResendConfirmationInput,
        now: DateTime<Utc>,
    ) -> AccountResult<()> {
        let email = UserEmail::new(&input.email).map_err(|e| {
            let mut errors = ValidationErrors::new();
            errors.add(FIELD_EMAIL, e.to_string());
            AccountError::Validation(errors)
        })?;

        let Some(account) = self.account_repo.find_by_email(&email).await? else {
            tracing::debug!("Confirmation resend for unknown email ignored");
            return Ok(());
        };

        if account.is_verified() {
            tracing::debug!(user_id = %account.id(), "Confirmation resend for verified account ignored");
            return Ok(());
        }

        let token =
            ensure_unique_token(self.confirmation_repo.as_ref(), OneTimeToken::create(now)).await?;

        let confirmation = match self.confirmation_repo.find_by_user_id(account.id()).await? {
            Some(mut confirmation) => {
                confirmation.re_obtain(token);
                confirmation
            }
            None => {
                // Swept after expiry; start over with a new pair
                tracing::debug!(user_id = %account.id(), "Pending account had no confirmation");
                RegistrationConfirmation::create(*account.id(), token)
            }
        };
        self.confirmation_repo.save(&confirmation).await?;

        tracing::info!(user_id = %account.id(), "Registration confirmation reissued");

        send_confirmation_email(
            self.email_sender.as_ref(),
            &self.config,
            account.email(),
            &confirmation,
        )
        .await;

        Ok(())
    }
}
