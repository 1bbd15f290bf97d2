//! Change Name Use Case

use std::sync::Arc;

use crate::application::validation::{FIELD_NAME, ValidationErrors};
use crate::domain::gateway::SessionAuthentication;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::user_name::UserName;
use crate::error::{AccountError, AccountResult};

/// Change name input
pub struct ChangeNameInput {
    pub name: String,
}

/// Change name output
#[derive(Debug)]
pub struct ChangeNameOutput {
    pub name: String,
}

/// Renames the signed-in account
pub struct ChangeNameUseCase<R, S>
where
    R: AccountRepository,
    S: SessionAuthentication,
{
    account_repo: Arc<R>,
    session: Arc<S>,
}

impl<R, S> ChangeNameUseCase<R, S>
where
    R: AccountRepository,
    S: SessionAuthentication,
{
    pub fn new(account_repo: Arc<R>, session: Arc<S>) -> Self {
        Self {
            account_repo,
            session,
        }
    }

    pub async fn execute(&self, input: ChangeNameInput) -> AccountResult<ChangeNameOutput> {
        let user_id = self
            .session
            .current_user_id()
            .await?
            .ok_or(AccountError::NotAuthenticated)?;

        let name = UserName::new(input.name).map_err(|e| {
            let mut errors = ValidationErrors::new();
            errors.add(FIELD_NAME, e.to_string());
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

        account.change_name(name)?;
        self.account_repo.save(&account).await?;

        tracing::info!(user_id = %user_id, "Name changed");

        Ok(ChangeNameOutput {
            name: account.name().as_str().to_string(),
        })
    }
}
