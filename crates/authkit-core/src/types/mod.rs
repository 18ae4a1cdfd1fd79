//! Configuration value types.
//!
//! These types enforce format invariants at construction time.

mod client_secret;
mod pool_endpoint;
mod user_pool_id;

pub use client_secret::ClientSecret;
pub use pool_endpoint::PoolEndpoint;
pub use user_pool_id::UserPoolId;
