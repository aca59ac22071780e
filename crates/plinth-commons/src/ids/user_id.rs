//! Type-safe wrapper for user identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CommonError;

/// Type-safe wrapper for user identifiers.
///
/// Ensures user ids cannot be accidentally swapped with session ids or
/// component names in function signatures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId from a string.
    ///
    /// # Panics
    /// Panics if the id is empty or contains whitespace/control characters.
    /// Use `try_new()` for fallible creation.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self::try_new(id).expect("UserId contains invalid characters")
    }

    /// Creates a new UserId, returning an error if validation fails.
    ///
    /// User ids travel through cookies and storage keys, so whitespace,
    /// control characters, and empty values are rejected.
    pub fn try_new(id: impl Into<String>) -> Result<Self, CommonError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CommonError::InvalidInput("User id cannot be empty".to_string()));
        }
        if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(CommonError::InvalidInput(
                "User id cannot contain whitespace or control characters".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Returns the user id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner String.
    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user_id() {
        let user = UserId::try_new("usr_42");
        assert!(user.is_ok());
        assert_eq!(user.unwrap().as_str(), "usr_42");
    }

    #[test]
    fn test_empty_user_id_blocked() {
        assert!(UserId::try_new("").is_err());
    }

    #[test]
    fn test_whitespace_blocked() {
        assert!(UserId::try_new("usr 42").is_err());
        assert!(UserId::try_new("usr\n42").is_err());
    }

    #[test]
    #[should_panic(expected = "invalid characters")]
    fn test_new_panics_on_invalid() {
        let _ = UserId::new("");
    }
}
