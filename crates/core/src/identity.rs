use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Longest user identifier the identity provider accepts.
pub const USER_ID_MAX_LENGTH: usize = 128;

/// Identity-provider user identifier, shared with the role document key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Creates a validated user identifier.
    ///
    /// The value must be non-empty, at most [`USER_ID_MAX_LENGTH`] characters
    /// and must not contain `/`, since it doubles as a document path segment.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();

        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "user id must not be empty or whitespace".to_owned(),
            ));
        }

        if value.chars().count() > USER_ID_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "user id must be at most {USER_ID_MAX_LENGTH} characters"
            )));
        }

        if value.contains('/') {
            return Err(AppError::Validation(format!(
                "user id '{value}' must not contain '/'"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for UserId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl Display for UserId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{USER_ID_MAX_LENGTH, UserId};

    #[test]
    fn user_id_accepts_provider_style_uid() {
        let user_id = UserId::new("Xy7pQ2rLmN0aBcD9eFgH1iJkL3m2");
        assert!(user_id.is_ok());
    }

    #[test]
    fn user_id_rejects_blank_value() {
        assert!(UserId::new("  ").is_err());
    }

    #[test]
    fn user_id_rejects_path_separator() {
        assert!(UserId::new("users/abc").is_err());
    }

    #[test]
    fn user_id_rejects_overlong_value() {
        let value = "a".repeat(USER_ID_MAX_LENGTH + 1);
        assert!(UserId::new(value).is_err());
    }

    #[test]
    fn user_id_displays_raw_value() {
        let user_id = UserId::new("uid-42");
        assert_eq!(
            user_id.map(|value| value.to_string()).unwrap_or_default(),
            "uid-42"
        );
    }
}
