//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic randomness for one-time credentials
//! - Constant-time comparison
//! - Password policy and hashing (Argon2id, NIST SP 800-63B)

pub mod crypto;
pub mod password;
