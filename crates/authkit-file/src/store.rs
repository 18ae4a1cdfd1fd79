//! Filesystem storage for the file-backed user pool.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use authkit_core::Result;
use authkit_core::error::{AuthError, Error, InvalidInputError, TransportError};

fn map_io(err: std::io::Error) -> Error {
    Error::Transport(TransportError::Io {
        message: err.to_string(),
    })
}

fn map_json(err: serde_json::Error) -> Error {
    Error::InvalidInput(InvalidInputError::Other {
        message: err.to_string(),
    })
}

/// A verification code waiting to be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Account record stored in the local pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalUser {
    /// Stable subject identifier.
    pub sub: String,
    /// Lowercased email address.
    pub username: String,
    /// When the account was created.
    pub created_at: String,
    /// Password hash (bcrypt).
    pub password_hash: String,
    /// Whether the sign-up code has been entered.
    pub confirmed: bool,
    #[serde(default)]
    pub pending_confirmation: Option<PendingCode>,
    #[serde(default)]
    pub pending_reset: Option<PendingCode>,
    /// Bumped on sign-out; tokens carrying an older generation are revoked.
    #[serde(default)]
    pub token_generation: u64,
}

/// Why a code was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutboxPurpose {
    ConfirmSignUp,
    ResetPassword,
}

/// A message "sent" by the local pool, appended to `outbox.jsonl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxMessage {
    pub to: String,
    pub purpose: OutboxPurpose,
    pub code: String,
    /// ISO 8601 timestamp.
    pub time: String,
}

/// Filesystem-backed storage for a local user pool.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a new file store at the given root directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn pool_dir(&self) -> PathBuf {
        self.root.join("pool")
    }

    fn users_dir(&self) -> PathBuf {
        self.pool_dir().join("users")
    }

    fn user_path(&self, sub: &str) -> PathBuf {
        self.users_dir().join(sub).join("user.json")
    }

    /// Path of the delivered-codes log.
    pub fn outbox_path(&self) -> PathBuf {
        self.pool_dir().join("outbox.jsonl")
    }

    /// Take an exclusive lock on one of the pool's lock files.
    ///
    /// Released when the returned handle is dropped.
    fn lock(&self, name: &str) -> Result<File> {
        let pool_dir = self.pool_dir();
        fs::create_dir_all(&pool_dir).map_err(map_io)?;

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(pool_dir.join(name))
            .map_err(map_io)?;

        lock_file.lock_exclusive().map_err(map_io)?;
        Ok(lock_file)
    }

    fn write_user(&self, user: &LocalUser) -> Result<()> {
        let path = self.user_path(&user.sub);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(map_io)?;
        }

        let content = serde_json::to_string_pretty(user).map_err(map_json)?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content).map_err(map_io)?;
        fs::rename(&temp_path, &path).map_err(map_io)?;
        Ok(())
    }

    // ========================================================================
    // User Management
    // ========================================================================

    /// Create an unconfirmed user. Fails if the username is taken.
    #[instrument(skip(self, password_hash, pending_confirmation))]
    pub fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        pending_confirmation: PendingCode,
    ) -> Result<LocalUser> {
        let _lock = self.lock("users.lock")?;

        if self.find_user(username)?.is_some() {
            return Err(AuthError::UsernameExists.into());
        }

        let user = LocalUser {
            sub: Uuid::new_v4().to_string(),
            username: username.to_lowercase(),
            created_at: Utc::now().to_rfc3339(),
            password_hash: password_hash.to_string(),
            confirmed: false,
            pending_confirmation: Some(pending_confirmation),
            pending_reset: None,
            token_generation: 0,
        };

        self.write_user(&user)?;

        debug!(sub = %user.sub, username = %user.username, "Created local user");

        Ok(user)
    }

    pub fn get_user(&self, sub: &str) -> Result<Option<LocalUser>> {
        let path = self.user_path(sub);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(map_io)?;
        let user = serde_json::from_str(&content).map_err(map_json)?;
        Ok(Some(user))
    }

    pub fn list_users(&self) -> Result<Vec<LocalUser>> {
        let users_dir = self.users_dir();

        if !users_dir.exists() {
            return Ok(Vec::new());
        }

        let mut users = Vec::new();

        for entry in fs::read_dir(&users_dir).map_err(map_io)? {
            let entry = entry.map_err(map_io)?;
            let user_file = entry.path().join("user.json");

            if user_file.exists() {
                let content = fs::read_to_string(&user_file).map_err(map_io)?;
                if let Ok(user) = serde_json::from_str::<LocalUser>(&content) {
                    users.push(user);
                }
            }
        }

        Ok(users)
    }

    /// Find a user by username, ignoring case.
    pub fn find_user(&self, username: &str) -> Result<Option<LocalUser>> {
        let wanted = username.to_lowercase();
        Ok(self
            .list_users()?
            .into_iter()
            .find(|u| u.username == wanted))
    }

    /// Load, modify and save a user under the pool lock.
    ///
    /// Nothing is written when `apply` fails.
    #[instrument(skip(self, apply))]
    pub fn update_user<T, F>(&self, username: &str, apply: F) -> Result<T>
    where
        F: FnOnce(&mut LocalUser) -> Result<T>,
    {
        let _lock = self.lock("users.lock")?;

        let mut user = self
            .find_user(username)?
            .ok_or(AuthError::UserNotFound)?;

        let out = apply(&mut user)?;
        self.write_user(&user)?;
        Ok(out)
    }

    // ========================================================================
    // Outbox
    // ========================================================================

    /// Append a delivered code to the outbox log.
    pub fn append_outbox(&self, to: &str, purpose: OutboxPurpose, code: &str) -> Result<()> {
        let _lock = self.lock("outbox.lock")?;

        let message = OutboxMessage {
            to: to.to_string(),
            purpose,
            code: code.to_string(),
            time: Utc::now().to_rfc3339(),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.outbox_path())
            .map_err(map_io)?;

        let line = serde_json::to_string(&message).map_err(map_json)?;
        writeln!(file, "{}", line).map_err(map_io)?;
        file.sync_data().map_err(map_io)?;

        Ok(())
    }

    /// Every message in the outbox, oldest first.
    pub fn read_outbox(&self) -> Result<Vec<OutboxMessage>> {
        let path = self.outbox_path();

        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).map_err(map_io)?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(map_json))
            .collect()
    }

    /// The newest code sent to `to` for `purpose`.
    pub fn latest_code(&self, to: &str, purpose: OutboxPurpose) -> Result<Option<String>> {
        let to = to.to_lowercase();
        Ok(self
            .read_outbox()?
            .into_iter()
            .rev()
            .find(|m| m.to == to && m.purpose == purpose)
            .map(|m| m.code))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use tempfile::TempDir;

    use super::*;

    fn pending() -> PendingCode {
        PendingCode {
            code: "123456".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[test]
    fn create_and_find_user_case_insensitively() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        let user = store
            .create_user("Alice@Example.com", "hash", pending())
            .unwrap();
        assert_eq!(user.username, "alice@example.com");
        assert!(!user.confirmed);

        let found = store.find_user("ALICE@example.COM").unwrap().unwrap();
        assert_eq!(found.sub, user.sub);
        assert!(store.get_user(&user.sub).unwrap().is_some());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        store.create_user("bob@example.com", "hash", pending()).unwrap();
        let err = store
            .create_user("BOB@example.com", "hash", pending())
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::UsernameExists)));
    }

    #[test]
    fn failed_update_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.create_user("carol@example.com", "hash", pending()).unwrap();

        let result: Result<()> = store.update_user("carol@example.com", |user| {
            user.confirmed = true;
            Err(AuthError::CodeMismatch.into())
        });
        assert!(result.is_err());

        let user = store.find_user("carol@example.com").unwrap().unwrap();
        assert!(!user.confirmed);
    }

    #[test]
    fn update_unknown_user() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let result = store.update_user("nobody@example.com", |_| Ok(()));
        assert!(matches!(result, Err(Error::Auth(AuthError::UserNotFound))));
    }

    #[test]
    fn outbox_keeps_latest_code_per_purpose() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        store
            .append_outbox("dave@example.com", OutboxPurpose::ConfirmSignUp, "111111")
            .unwrap();
        store
            .append_outbox("dave@example.com", OutboxPurpose::ResetPassword, "222222")
            .unwrap();
        store
            .append_outbox("dave@example.com", OutboxPurpose::ResetPassword, "333333")
            .unwrap();

        assert_eq!(store.read_outbox().unwrap().len(), 3);
        assert_eq!(
            store
                .latest_code("Dave@Example.com", OutboxPurpose::ResetPassword)
                .unwrap()
                .as_deref(),
            Some("333333")
        );
        assert_eq!(
            store
                .latest_code("dave@example.com", OutboxPurpose::ConfirmSignUp)
                .unwrap()
                .as_deref(),
            Some("111111")
        );
    }
}
