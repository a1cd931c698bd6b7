use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest display name accepted at sign-in.
pub const MAX_USER_NAME_CHARS: usize = 20;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NameError {
    #[error("user name cannot be empty")]
    EmptyUser,

    #[error("user name is longer than {max} characters ({len})")]
    UserTooLong { len: usize, max: usize },

    #[error("exercise name cannot be empty")]
    EmptyExercise,
}

/// Name a ledger row is filed under (trimmed, non-empty).
///
/// Rows already in the shared ledger may carry names of any length; the
/// [`MAX_USER_NAME_CHARS`] cap applies only to names typed at sign-in, see
/// [`UserName::for_sign_in`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Create a validated user name.
    ///
    /// # Errors
    ///
    /// Returns `NameError::EmptyUser` if the name is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, NameError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NameError::EmptyUser);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Create a user name from sign-in input, bounded to [`MAX_USER_NAME_CHARS`].
    ///
    /// # Errors
    ///
    /// Returns `NameError::EmptyUser` if the name is blank, or
    /// `NameError::UserTooLong` if it is too long.
    pub fn for_sign_in(value: impl Into<String>) -> Result<Self, NameError> {
        let name = Self::new(value)?;
        let len = name.0.chars().count();
        if len > MAX_USER_NAME_CHARS {
            return Err(NameError::UserTooLong {
                len,
                max: MAX_USER_NAME_CHARS,
            });
        }
        Ok(name)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated exercise name (trimmed, non-empty).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExerciseName(String);

impl ExerciseName {
    /// Create a validated exercise name.
    ///
    /// # Errors
    ///
    /// Returns `NameError::EmptyExercise` if the name is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, NameError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NameError::EmptyExercise);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ─── Conversions ───────────────────────────────────────────────────────────────

impl TryFrom<String> for UserName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl FromStr for UserName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ExerciseName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExerciseName> for String {
    fn from(value: ExerciseName) -> Self {
        value.0
    }
}

impl FromStr for ExerciseName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserName({:?})", self.0)
    }
}

impl fmt::Debug for ExerciseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExerciseName({:?})", self.0)
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ExerciseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
