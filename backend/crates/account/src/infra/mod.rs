//! Infrastructure Layer
//!
//! Database implementations, in-process adapters and email senders.

pub mod email;
pub mod in_memory;
pub mod postgres;

pub use email::{InMemoryOutbox, LogEmailSender, SentEmail};
pub use in_memory::{InMemoryClientRegistry, InMemorySession, InMemoryStore};
pub use postgres::PgAccountRepository;
