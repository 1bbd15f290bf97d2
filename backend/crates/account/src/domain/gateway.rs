//! Collaborator Traits
//!
//! Capabilities the workflows consume but do not implement: email delivery,
//! the login session of the current transport, and OAuth client checks.

use std::collections::BTreeMap;

use crate::domain::value_object::{email::UserEmail, user_id::UserId};
use crate::error::AccountResult;

/// Template variables, sorted by name
pub type EmailVariables = BTreeMap<&'static str, String>;

/// Best-effort email dispatch
#[trait_variant::make(EmailSender: Send)]
pub trait LocalEmailSender {
    async fn send(
        &self,
        template: &str,
        recipient: &UserEmail,
        variables: &EmailVariables,
    ) -> AccountResult<()>;
}

/// Login state of the current caller
///
/// Session cookies and bearer tokens each provide their own implementation.
#[trait_variant::make(SessionAuthentication: Send)]
pub trait LocalSessionAuthentication {
    async fn mark_as_logged_in(&self, user_id: UserId) -> AccountResult<()>;

    async fn current_user_id(&self) -> AccountResult<Option<UserId>>;

    async fn logout(&self) -> AccountResult<()>;
}

/// Checks that a redirect URL is registered for an OAuth client
#[trait_variant::make(ClientRedirectVerifier: Send)]
pub trait LocalClientRedirectVerifier {
    async fn is_valid_redirect(&self, client_id: &str, redirect_url: &str) -> AccountResult<bool>;
}
