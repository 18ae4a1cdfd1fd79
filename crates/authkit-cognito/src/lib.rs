//! authkit-cognito - Cognito User Pool identity provider.

mod api;
mod provider;
mod secret_hash;

pub use api::CognitoClient;
pub use provider::CognitoProvider;
pub use secret_hash::secret_hash;
