//! The process-wide session.

use std::sync::{Mutex, OnceLock, PoisonError};

use tracing::debug;

use authkit_core::error::InvalidInputError;
use authkit_core::{Result, SessionConfig};

use crate::session::AuthSession;

static SHARED: OnceLock<AuthSession> = OnceLock::new();
static INIT: Mutex<()> = Mutex::new(());

/// The process-wide session.
///
/// The first call builds it from `AUTHKIT_*` environment variables unless
/// one was put in place with [`install`]. Later calls return the same
/// instance.
///
/// # Errors
///
/// Fails if no session is installed yet and the environment does not
/// describe a usable configuration. A later call retries.
pub fn shared() -> Result<&'static AuthSession> {
    if let Some(session) = SHARED.get() {
        return Ok(session);
    }

    let _init = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(session) = SHARED.get() {
        return Ok(session);
    }

    let session = AuthSession::new(SessionConfig::from_env()?)?;
    debug!(pool = %session.config().user_pool_id(), "Created shared session");
    Ok(SHARED.get_or_init(|| session))
}

/// Make `session` the process-wide session.
///
/// # Errors
///
/// Fails if a shared session already exists.
pub fn install(session: AuthSession) -> Result<&'static AuthSession> {
    let _init = INIT.lock().unwrap_or_else(PoisonError::into_inner);

    SHARED.set(session).map_err(|_| InvalidInputError::Config {
        key: "shared session".to_string(),
        reason: "already initialized".to_string(),
    })?;

    SHARED.get().ok_or_else(|| {
        InvalidInputError::Config {
            key: "shared session".to_string(),
            reason: "not initialized".to_string(),
        }
        .into()
    })
}
