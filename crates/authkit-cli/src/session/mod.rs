//! Loading and saving the CLI's session between invocations.

pub mod storage;

use anyhow::{Context, Result};
use tracing::debug;

use authkit::{AuthSession, TokenBundle};

use crate::cli::PoolArgs;
use storage::{StoredState, StoredUser};

/// Build the shared session for this invocation and restore saved state.
///
/// A saved user is only restored when it belongs to the resolved pool.
pub async fn open(pool: &PoolArgs) -> Result<&'static AuthSession> {
    let stored = storage::load().context("Failed to load session")?;
    let config = pool.resolve(stored.config.as_ref())?;

    let same_pool = stored.config.as_ref().is_some_and(|saved| {
        saved.user_pool_id() == config.user_pool_id() && saved.endpoint() == config.endpoint()
    });

    let session = authkit::install(AuthSession::new(config)?)?;

    if !same_pool && stored.user.is_some() {
        debug!("Saved user belongs to another pool, ignoring it");
    }
    let user = stored.user.filter(|_| same_pool).map(Into::into);
    session.restore(user, stored.usage).await;

    if same_pool && !stored.external_tokens.is_empty() {
        session.set_external_tokens(stored.external_tokens.into_iter().collect::<TokenBundle>());
    }

    Ok(session)
}

/// Persist the session's current state.
pub fn persist(session: &AuthSession) -> Result<()> {
    let state = StoredState {
        config: Some(session.config().clone()),
        user: session.current_user().as_ref().map(StoredUser::from),
        usage: session.usage(),
        external_tokens: session
            .external_tokens()
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
    };

    storage::save(&state).context("Failed to save session")
}
