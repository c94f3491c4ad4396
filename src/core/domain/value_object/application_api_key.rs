use crate::core::domain::error::ValidationError;
use std::fmt;

/// A panel application API key (sent as a bearer token, only stored in memory).
#[derive(Clone)]
pub struct ApplicationApiKey(String);

impl ApplicationApiKey {
    /// Creates a new API key after validating it.
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();
        validate_api_key(&key)?;
        Ok(Self(key))
    }

    /// Creates a new API key without validation.
    pub(crate) fn new_unchecked(key: String) -> Self {
        Self(key)
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// The key is a credential; keep it out of debug output.
impl fmt::Debug for ApplicationApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApplicationApiKey(***)")
    }
}

/// Validates an application API key.
///
/// Panel application keys are opaque tokens (commonly `ptla_`-prefixed);
/// only shape is checked here, never the prefix.
pub(crate) fn validate_api_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() {
        return Err(ValidationError::Field {
            field: "api_key".to_string(),
            message: "API key cannot be empty".to_string(),
        });
    }
    if key.len() < 32 {
        return Err(ValidationError::Format(
            "API key must be at least 32 characters long".to_string(),
        ));
    }
    if key.len() > 128 {
        return Err(ValidationError::Format(
            "API key cannot exceed 128 characters".to_string(),
        ));
    }
    if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::Format(
            "API key cannot contain whitespace or control characters".to_string(),
        ));
    }
    Ok(())
}
