//! Entity Module

pub mod authentication_account;
pub mod registration_confirmation;
