//! Application Layer
//!
//! Use cases and application services.

pub mod change_name;
pub mod change_password;
pub mod complete_registration;
pub mod config;
pub mod register;
pub mod resend_confirmation;
pub mod sign_in;
pub mod validation;

// Re-exports
pub use change_name::{ChangeNameInput, ChangeNameOutput, ChangeNameUseCase};
pub use change_password::{ChangePasswordInput, ChangePasswordOutput, ChangePasswordUseCase};
pub use complete_registration::{CompleteRegistrationInput, CompleteRegistrationUseCase};
pub use config::AccountConfig;
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use resend_confirmation::{ResendConfirmationInput, ResendConfirmationUseCase};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use validation::{FieldError, ValidationErrors};
