//! Core traits for identity provider behavior.

mod provider;

pub use provider::{CodeDelivery, IdentityProvider, SignUpOutput};
