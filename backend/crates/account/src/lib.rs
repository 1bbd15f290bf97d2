//! Account (Identity Lifecycle) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Aggregates, value objects, repository and collaborator traits
//! - `application/` - Use cases, validation and configuration
//! - `infra/` - PostgreSQL and in-process implementations
//!
//! ## Features
//! - Provisional registration with email-delivered one-time credentials
//! - Registration confirmation by token + one-time password
//! - Sign in with failed-login counting and temporary lockout
//! - Password change for verified, unlocked accounts
//! - Display name, initially the email's local part
//!
//! ## Consistency Model
//! - Account and confirmation writes commit together through `UnitOfWork`
//! - Email and token uniqueness enforced by storage constraints
//! - Confirmation failures collapse into one `InvalidCredential` signal
//! - Resend recreates a confirmation the expiry sweep removed

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

// Re-exports for convenience
pub use application::config::AccountConfig;
pub use error::{AccountError, AccountResult};
pub use infra::postgres::PgAccountRepository;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
}

pub mod store {
    pub use crate::infra::in_memory::InMemoryStore;
    pub use crate::infra::postgres::PgAccountRepository as AccountStore;
}
