use crate::core::domain::error::ValidationError;

/// A validated panel port number.
#[derive(Debug, Clone, Copy)]
pub struct PanelPort(u16);

impl PanelPort {
    /// Creates a new port after validating it.
    pub fn new(port: u16) -> Result<Self, ValidationError> {
        validate_port(port)?;
        Ok(Self(port))
    }

    /// Creates a new port without validation.
    pub(crate) fn new_unchecked(port: u16) -> Self {
        Self(port)
    }

    /// Returns the port number.
    #[must_use]
    pub fn get(&self) -> u16 {
        self.0
    }
}

/// Validates a port number. Zero is the only invalid value; panels commonly
/// listen on 443, 80 or 8080.
pub(crate) fn validate_port(port: u16) -> Result<(), ValidationError> {
    if port == 0 {
        return Err(ValidationError::Field {
            field: "port".to_string(),
            message: "Port must be between 1 and 65535".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_port_valid() {
        assert!(validate_port(443).is_ok());
        assert!(validate_port(80).is_ok());
        assert!(validate_port(65535).is_ok());
    }

    #[test]
    fn test_validate_port_invalid() {
        assert!(validate_port(0).is_err());
    }

    #[test]
    fn test_port_new_unchecked() {
        let port = PanelPort::new_unchecked(8080);
        assert_eq!(port.get(), 8080);
    }
}
