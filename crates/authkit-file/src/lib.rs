//! File-backed user pool for authkit.
//!
//! Stores accounts under a local directory and writes verification codes
//! to an outbox file instead of sending email. Selected by a `file://`
//! endpoint; useful for development and tests.

mod provider;
mod store;

pub use provider::FileProvider;
pub use store::{FileStore, LocalUser, OutboxMessage, OutboxPurpose, PendingCode};
