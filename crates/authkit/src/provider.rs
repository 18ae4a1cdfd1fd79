//! Provider selection by endpoint scheme.

use std::sync::Arc;

use tracing::debug;

use authkit_cognito::CognitoProvider;
use authkit_core::error::InvalidInputError;
use authkit_core::{IdentityProvider, Result, SessionConfig};
use authkit_file::FileProvider;

/// Build the identity provider a configuration points at.
///
/// `file://` endpoints get a local [`FileProvider`]; network endpoints get a
/// [`CognitoProvider`].
pub fn connect(config: &SessionConfig) -> Result<Arc<dyn IdentityProvider>> {
    let endpoint = config.endpoint();

    if endpoint.is_local() {
        let root = endpoint
            .to_file_path()
            .ok_or_else(|| InvalidInputError::PoolEndpoint {
                value: endpoint.to_string(),
                reason: "not a usable file path".to_string(),
            })?;
        debug!(root = %root.display(), "Using file user pool");
        return Ok(Arc::new(FileProvider::new(root)));
    }

    debug!(%endpoint, "Using Cognito user pool");
    Ok(Arc::new(CognitoProvider::new(config)?))
}
