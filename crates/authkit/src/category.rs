//! Analytics classification of the signed-in user.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Counters behind [`UserCategory`].
///
/// Counted per device, not per account: every sign-in through the session
/// counts, whoever signs in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Successful sign-ins recorded by this facade.
    #[serde(default)]
    pub sign_ins: u32,
    /// Whether the user has produced an avatar.
    #[serde(default)]
    pub avatar_created: bool,
}

impl UsageStats {
    /// Classify these counters.
    pub fn category(&self) -> UserCategory {
        match (self.sign_ins <= 1, self.avatar_created) {
            (true, false) => UserCategory::FirstTime,
            (true, true) => UserCategory::FirstTimeCreatedAvatar,
            (false, false) => UserCategory::Returning,
            (false, true) => UserCategory::ReturningCreatedAvatar,
        }
    }
}

/// Coarse user segment reported to analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCategory {
    FirstTime,
    FirstTimeCreatedAvatar,
    Returning,
    ReturningCreatedAvatar,
}

impl UserCategory {
    /// The tag string sent to analytics.
    pub fn as_str(self) -> &'static str {
        match self {
            UserCategory::FirstTime => "first-time",
            UserCategory::FirstTimeCreatedAvatar => "first-time-created-avatar",
            UserCategory::Returning => "returning",
            UserCategory::ReturningCreatedAvatar => "returning-created-avatar",
        }
    }
}

impl fmt::Display for UserCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
