//! Cognito Identity Provider JSON API.
//!
//! This module provides the HTTP client and wire types for the user pool
//! operations authkit uses.

mod client;
mod endpoints;

pub use client::CognitoClient;
pub(crate) use client::map_error;
pub(crate) use endpoints::*;
