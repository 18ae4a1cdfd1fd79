//! Token types issued by identity providers.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};

macro_rules! opaque_token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        ///
        /// # Security
        ///
        /// - Never logged or displayed in Debug output
        /// - Treat as opaque; do not parse or inspect
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            pub fn new(token: impl Into<String>) -> Self {
                Self(token.into())
            }

            /// Returns the raw token value for provider requests and persistence.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&"[REDACTED]").finish()
            }
        }
    };
}

opaque_token!(
    /// A short-lived token authorizing calls on behalf of the user.
    AccessToken
);

opaque_token!(
    /// An identity token carrying user claims.
    IdToken
);

opaque_token!(
    /// A longer-lived token used to obtain new access tokens without
    /// re-entering credentials.
    RefreshToken
);

/// Tokens held by a signed-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: AccessToken,
    pub id_token: Option<IdToken>,
    pub refresh_token: Option<RefreshToken>,
    /// When the access token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// Build a token set whose access token expires `expires_in` seconds from now.
    ///
    /// Returns `None` when the expiry is not a representable time.
    pub fn issued_now(
        access_token: AccessToken,
        id_token: Option<IdToken>,
        refresh_token: Option<RefreshToken>,
        expires_in: i64,
    ) -> Option<Self> {
        let expires_at = Utc::now().checked_add_signed(Duration::try_seconds(expires_in)?)?;
        Some(Self {
            access_token,
            id_token,
            refresh_token,
            expires_at,
        })
    }

    pub fn access_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// True when the access token has expired and nothing can renew it.
    pub fn is_known_expired(&self, now: DateTime<Utc>) -> bool {
        self.access_expired_at(now) && self.refresh_token.is_none()
    }

    /// Merge a refresh result into this set.
    ///
    /// Providers may omit the refresh token (and id token) from a refresh
    /// response; the ones already held stay in place.
    pub fn merge_refreshed(&mut self, refreshed: TokenSet) {
        self.access_token = refreshed.access_token;
        self.expires_at = refreshed.expires_at;
        if refreshed.id_token.is_some() {
            self.id_token = refreshed.id_token;
        }
        if refreshed.refresh_token.is_some() {
            self.refresh_token = refreshed.refresh_token;
        }
    }
}

/// Named tokens obtained from another identity provider (for example a
/// hosted-UI or social sign-in), passed through without interpretation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TokenBundle(BTreeMap<String, String>);

impl TokenBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, token: impl Into<String>) {
        self.0.insert(name.into(), token.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Token names, without values.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for TokenBundle {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// Names are useful in logs; values are secrets.
impl fmt::Debug for TokenBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.keys().map(|k| (k, "[REDACTED]")))
            .finish()
    }
}
