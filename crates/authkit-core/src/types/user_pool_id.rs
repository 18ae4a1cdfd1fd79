//! User pool identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated user pool identifier of the form `<region>_<id>`.
///
/// # Example
///
/// ```
/// use authkit_core::UserPoolId;
///
/// let pool = UserPoolId::new("us-east-1_AbCdEf123").unwrap();
/// assert_eq!(pool.region(), "us-east-1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserPoolId(String);

impl UserPoolId {
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the region prefix.
    pub fn region(&self) -> &str {
        // Validated at construction
        self.0.split_once('_').map(|(r, _)| r).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::UserPoolId {
                value: s.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        let (region, id) = s
            .split_once('_')
            .ok_or_else(|| invalid("must have format '<region>_<id>'"))?;

        if region.is_empty()
            || !region
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(invalid("region must be lowercase letters, digits and '-'"));
        }

        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid("id must be non-empty and alphanumeric"));
        }

        Ok(())
    }
}

impl fmt::Display for UserPoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserPoolId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for UserPoolId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<UserPoolId> for String {
    fn from(id: UserPoolId) -> Self {
        id.0
    }
}
