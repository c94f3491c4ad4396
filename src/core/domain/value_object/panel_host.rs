use crate::core::domain::error::ValidationError;

/// A validated panel hostname or IP address.
#[derive(Debug, Clone)]
pub struct PanelHost(String);

impl PanelHost {
    /// Creates a new host after validating it.
    pub fn new(host: impl Into<String>) -> Result<Self, ValidationError> {
        let host = host.into();
        validate_host(&host)?;
        Ok(Self(host))
    }

    /// Creates a new host without validation.
    pub(crate) fn new_unchecked(host: String) -> Self {
        Self(host)
    }

    /// Returns the hostname as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validates a hostname according to RFC 1035 label rules.
///
/// IPv4 literals pass the same rules (digit-only labels are valid labels).
pub(crate) fn validate_host(host: &str) -> Result<(), ValidationError> {
    if host.is_empty() {
        return Err(ValidationError::Field {
            field: "host".to_string(),
            message: "Host cannot be empty".to_string(),
        });
    }

    if host.len() > 253 {
        return Err(ValidationError::ConstraintViolation(
            "Host length exceeds maximum of 253 characters".to_string(),
        ));
    }

    for label in host.split('.') {
        if label.is_empty() || label.len() > 63 {
            return Err(ValidationError::Format(
                "Hostname labels must be between 1 and 63 characters".to_string(),
            ));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ValidationError::Format(
                "Hostname labels can only contain alphanumeric characters and hyphens".to_string(),
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(ValidationError::Format(
                "Hostname labels cannot start or end with a hyphen".to_string(),
            ));
        }
    }

    Ok(())
}
