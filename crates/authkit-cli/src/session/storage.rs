//! Session storage for persisting login state.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use authkit::{
    AccessToken, CurrentUser, IdToken, RefreshToken, SessionConfig, TokenSet, UsageStats,
};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Everything kept between invocations.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoredState {
    /// Pool the saved user belongs to.
    #[serde(default)]
    pub config: Option<SessionConfig>,
    #[serde(default)]
    pub user: Option<StoredUser>,
    #[serde(default)]
    pub usage: UsageStats,
    #[serde(default)]
    pub external_tokens: BTreeMap<String, String>,
}

/// Stored user and tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredUser {
    username: String,
    access_token: String,
    id_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: DateTime<Utc>,
}

impl From<&CurrentUser> for StoredUser {
    fn from(user: &CurrentUser) -> Self {
        Self {
            username: user.username.clone(),
            access_token: user.tokens.access_token.as_str().to_string(),
            id_token: user.tokens.id_token.as_ref().map(|t| t.as_str().to_string()),
            refresh_token: user
                .tokens
                .refresh_token
                .as_ref()
                .map(|t| t.as_str().to_string()),
            expires_at: user.tokens.expires_at,
        }
    }
}

impl From<StoredUser> for CurrentUser {
    fn from(stored: StoredUser) -> Self {
        CurrentUser {
            username: stored.username,
            tokens: TokenSet {
                access_token: AccessToken::new(stored.access_token),
                id_token: stored.id_token.map(IdToken::new),
                refresh_token: stored.refresh_token.map(RefreshToken::new),
                expires_at: stored.expires_at,
            },
        }
    }
}

/// Get the session file path.
fn session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "authkit").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// Save state to disk.
pub fn save(state: &StoredState) -> Result<()> {
    let path = session_path()?;
    let json = serde_json::to_string_pretty(state)?;

    fs::write(&path, &json).context("Failed to write session file")?;

    // Tokens are bearer credentials.
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    Ok(())
}

/// Load state from disk; empty if nothing was saved.
pub fn load() -> Result<StoredState> {
    let path = session_path()?;

    if !path.exists() {
        return Ok(StoredState::default());
    }

    let json = fs::read_to_string(&path).context("Failed to read session file")?;
    serde_json::from_str(&json).context("Invalid session file")
}
