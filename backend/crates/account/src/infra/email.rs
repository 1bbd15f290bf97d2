//! Email Sender Implementations
//!
//! Real transports live outside this crate. These cover development and tests.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use crate::domain::gateway::{EmailSender, EmailVariables};
use crate::domain::value_object::email::UserEmail;
use crate::error::{AccountError, AccountResult};

/// Records dispatches in the log; variables are never logged
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

impl LogEmailSender {
    pub fn new() -> Self {
        Self
    }
}

impl EmailSender for LogEmailSender {
    async fn send(
        &self,
        template: &str,
        recipient: &UserEmail,
        variables: &EmailVariables,
    ) -> AccountResult<()> {
        tracing::info!(
            template = %template,
            recipient_domain = %recipient.domain(),
            variable_count = variables.len(),
            "Email dispatched"
        );
        Ok(())
    }
}

/// A message captured by [`InMemoryOutbox`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub template: String,
    pub recipient: UserEmail,
    pub variables: EmailVariables,
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct InMemoryOutbox {
    sent: Mutex<Vec<SentEmail>>,
    failing: AtomicBool,
}

impl InMemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent send fails
    pub fn failing() -> Self {
        Self {
            failing: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().await.clone()
    }

    pub async fn last(&self) -> Option<SentEmail> {
        self.sent.lock().await.last().cloned()
    }
}

impl EmailSender for InMemoryOutbox {
    async fn send(
        &self,
        template: &str,
        recipient: &UserEmail,
        variables: &EmailVariables,
    ) -> AccountResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AccountError::Internal("mail transport unavailable".to_string()));
        }
        self.sent.lock().await.push(SentEmail {
            template: template.to_string(),
            recipient: recipient.clone(),
            variables: variables.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_outbox_captures_messages() {
        let outbox = InMemoryOutbox::new();
        let recipient = UserEmail::new("test@example.com").unwrap();
        let mut variables = EmailVariables::new();
        variables.insert("oneTimePassword", "123456".to_string());

        outbox.send("welcome", &recipient, &variables).await.unwrap();

        let sent = outbox.last().await.unwrap();
        assert_eq!(sent.template, "welcome");
        assert_eq!(sent.recipient, recipient);
        assert_eq!(sent.variables["oneTimePassword"], "123456");
        assert_eq!(outbox.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failing_outbox() {
        let outbox = InMemoryOutbox::failing();
        let recipient = UserEmail::new("test@example.com").unwrap();
        let result = outbox.send("welcome", &recipient, &EmailVariables::new()).await;
        assert!(result.is_err());
        assert!(outbox.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_log_sender_succeeds() {
        let recipient = UserEmail::new("test@example.com").unwrap();
        let result = LogEmailSender::new()
            .send("welcome", &recipient, &EmailVariables::new())
            .await;
        assert!(result.is_ok());
    }
}
