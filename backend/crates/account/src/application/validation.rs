//! Field-level validation results
//!
//! Workflows collect every failure before deciding, so callers can render all
//! messages at once.

use serde::Serialize;
use std::fmt;

use crate::error::{AccountError, AccountResult};

// Field names as the calling layer submits them
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PASSWORD: &str = "password";
pub const FIELD_PASSWORD_CONFIRMATION: &str = "passwordConfirmation";
pub const FIELD_ONE_TIME_TOKEN: &str = "oneTimeToken";
pub const FIELD_NAME: &str = "name";

/// Messages for one input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub messages: Vec<String>,
}

/// Ordered `(field, messages)` pairs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message; fields keep first-seen order
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        let message = message.into();
        match self.fields.iter_mut().find(|f| f.field == field) {
            Some(existing) => existing.messages.push(message),
            None => self.fields.push(FieldError {
                field,
                messages: vec![message],
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields with at least one message
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.messages.as_slice())
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.fields.iter()
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> AccountResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AccountError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.field, field.messages.join(", "))?;
        }
        Ok(())
    }
}
