//! Register Use Case
//!
//! Provisional registration: creates an unverified account and its
//! confirmation in one transaction, then mails the one-time credentials.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::AccountConfig;
use crate::application::validation::{
    FIELD_EMAIL, FIELD_ONE_TIME_TOKEN, FIELD_PASSWORD, FIELD_PASSWORD_CONFIRMATION,
    ValidationErrors,
};
use crate::domain::entity::{
    authentication_account::AuthenticationAccount,
    registration_confirmation::RegistrationConfirmation,
};
use crate::domain::gateway::{EmailSender, EmailVariables};
use crate::domain::repository::{AccountRepository, ConfirmationRepository, UnitOfWork};
use crate::domain::service::{UniqueEmail, UniqueToken, ensure_unique_email, ensure_unique_token};
use crate::domain::value_object::{
    email::UserEmail,
    one_time_token::OneTimeToken,
    user_id::UserId,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AccountError, AccountResult};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub user_id: UserId,
    /// For building the confirmation link
    pub one_time_token: String,
}

/// Everything the aggregates need, already checked
struct ValidatedRegistration {
    email: UniqueEmail,
    password: RawPassword,
    token: UniqueToken,
}

/// Register use case
pub struct RegisterUseCase<R, C, W, E>
where
    R: AccountRepository,
    C: ConfirmationRepository,
    W: UnitOfWork,
    E: EmailSender,
{
    account_repo: Arc<R>,
    confirmation_repo: Arc<C>,
    unit_of_work: Arc<W>,
    email_sender: Arc<E>,
    config: Arc<AccountConfig>,
}

impl<R, C, W, E> RegisterUseCase<R, C, W, E>
where
    R: AccountRepository,
    C: ConfirmationRepository,
    W: UnitOfWork,
    E: EmailSender,
{
    pub fn new(
        account_repo: Arc<R>,
        confirmation_repo: Arc<C>,
        unit_of_work: Arc<W>,
        email_sender: Arc<E>,
        config: Arc<AccountConfig>,
    ) -> Self {
        Self {
            account_repo,
            confirmation_repo,
            unit_of_work,
            email_sender,
            config,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AccountResult<RegisterOutput> {
        self.execute_at(input, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        input: RegisterInput,
        now: DateTime<Utc>,
    ) -> AccountResult<RegisterOutput> {
        let validated = self.validate(input, now).await?;

        let password_hash = UserPassword::from_raw(&validated.password, self.config.pepper())?;
        let account = AuthenticationAccount::create(
            self.account_repo.next_user_id(),
            validated.email,
            password_hash,
        );
        let confirmation = RegistrationConfirmation::create(*account.id(), validated.token);

        self.unit_of_work
            .perform_transaction(|tx| {
                tx.save_account(&account);
                tx.save_confirmation(&confirmation);
                Ok(())
            })
            .await?;

        tracing::info!(user_id = %account.id(), "Account provisionally registered");

        send_confirmation_email(
            self.email_sender.as_ref(),
            &self.config,
            account.email(),
            &confirmation,
        )
        .await;

        Ok(RegisterOutput {
            user_id: *account.id(),
            one_time_token: confirmation.one_time_token().value().as_str().to_string(),
        })
    }

    /// Run every check and collect all failures
    async fn validate(
        &self,
        input: RegisterInput,
        now: DateTime<Utc>,
    ) -> AccountResult<ValidatedRegistration> {
        let mut errors = ValidationErrors::new();

        let email = match UserEmail::new(&input.email) {
            Ok(email) => match ensure_unique_email(self.account_repo.as_ref(), email).await {
                Ok(unique) => Some(unique),
                Err(err @ AccountError::DuplicateEmail) => {
                    errors.add(FIELD_EMAIL, err.to_string());
                    None
                }
                Err(err) => return Err(err),
            },
            Err(err) => {
                errors.add(FIELD_EMAIL, err.to_string());
                None
            }
        };

        let confirmation_matches = input.password == input.password_confirmation;

        let password = match RawPassword::new(input.password) {
            Ok(password) => Some(password),
            Err(err) => {
                errors.add(FIELD_PASSWORD, err.to_string());
                None
            }
        };

        if !confirmation_matches {
            errors.add(
                FIELD_PASSWORD_CONFIRMATION,
                "Password confirmation does not match",
            );
        }

        let token = match ensure_unique_token(
            self.confirmation_repo.as_ref(),
            OneTimeToken::create(now),
        )
        .await
        {
            Ok(unique) => Some(unique),
            Err(err @ AccountError::DuplicateToken) => {
                errors.add(FIELD_ONE_TIME_TOKEN, err.to_string());
                None
            }
            Err(err) => return Err(err),
        };

        match (email, password, token) {
            (Some(email), Some(password), Some(token)) if errors.is_empty() => {
                Ok(ValidatedRegistration {
                    email,
                    password,
                    token,
                })
            }
            _ => {
                tracing::debug!(fields = %errors, "Registration rejected by validation");
                Err(AccountError::Validation(errors))
            }
        }
    }
}

/// Mail the confirmation link and one-time password
///
/// Runs after commit. Failures are logged and never undo the registration.
pub(crate) async fn send_confirmation_email<E>(
    email_sender: &E,
    config: &AccountConfig,
    recipient: &UserEmail,
    confirmation: &RegistrationConfirmation,
) where
    E: EmailSender,
{
    let token = confirmation.one_time_token();
    let mut variables = EmailVariables::new();
    variables.insert(
        "confirmationUrl",
        config.confirmation_url(token.value().as_str()),
    );
    variables.insert(
        "oneTimePassword",
        confirmation.one_time_password().as_str().to_string(),
    );
    variables.insert("expiresAt", token.expiration().to_rfc3339());

    if let Err(e) = email_sender
        .send(&config.registration_email_template, recipient, &variables)
        .await
    {
        tracing::warn!(
            user_id = %confirmation.user_id(),
            error = %e,
            "Failed to send registration confirmation email"
        );
    }
}
