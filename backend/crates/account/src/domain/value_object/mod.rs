//! Value Object Module

pub mod account_status;
pub mod email;
pub mod login_restriction;
pub mod one_time_password;
pub mod one_time_token;
pub mod user_id;
pub mod user_name;
pub mod user_password;
