//! Domain Layer
//!
//! Contains entities, value objects, repository traits, collaborator traits
//! and domain services.

pub mod entity;
pub mod gateway;
pub mod repository;
pub mod service;
pub mod value_object;

// Re-exports
pub use entity::{
    authentication_account::AuthenticationAccount,
    registration_confirmation::RegistrationConfirmation,
};
pub use gateway::{ClientRedirectVerifier, EmailSender, EmailVariables, SessionAuthentication};
pub use repository::{AccountRepository, ConfirmationRepository, UnitOfWork, WriteSet};
