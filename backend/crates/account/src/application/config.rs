//! Application Configuration
//!
//! Configuration for the Account application layer.

/// Account application configuration
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Base URL of the confirmation page; the token is appended as `?token=`
    pub confirmation_url_base: String,
    /// Template reference handed to the email sender for confirmation mails
    pub registration_email_template: String,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            confirmation_url_base: "https://localhost/registration/confirm".to_string(),
            registration_email_template: "registration_confirmation".to_string(),
            password_pepper: None,
        }
    }
}

impl AccountConfig {
    /// Create config for development (plain http on localhost)
    pub fn development() -> Self {
        Self {
            confirmation_url_base: "http://localhost:8080/registration/confirm".to_string(),
            ..Default::default()
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Link the registrant opens to complete confirmation
    pub fn confirmation_url(&self, token: &str) -> String {
        let separator = if self.confirmation_url_base.contains('?') {
            '&'
        } else {
            '?'
        };
        format!("{}{}token={}", self.confirmation_url_base, separator, token)
    }
}
