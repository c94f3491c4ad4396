use crate::core::domain::{
    error::ValidationError,
    value_object::{panel_host::PanelHost, panel_port::PanelPort},
};
use url::Url;

/// The validated base URL of a panel installation.
///
/// Built from a host, port and scheme choice; API paths are joined onto it
/// when requests are issued.
#[derive(Debug, Clone)]
pub struct PanelUrl(String);

impl PanelUrl {
    /// Composes and validates the base URL from connection parts.
    pub fn new(host: &PanelHost, port: &PanelPort, secure: bool) -> Result<Self, ValidationError> {
        let scheme = if secure { "https" } else { "http" };
        let raw = format!("{}://{}:{}/", scheme, host.as_str(), port.get());
        validate_url(&raw)?;
        Ok(Self(raw))
    }

    /// Creates a new URL without validation.
    pub(crate) fn new_unchecked(url: String) -> Self {
        Self(url)
    }

    /// Returns the base URL as a string slice, including the trailing slash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins an API path onto the base URL.
    pub fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.0.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Validates a base URL: parseable, http(s) scheme, no query or fragment.
pub(crate) fn validate_url(url: &str) -> Result<(), ValidationError> {
    let parsed = Url::parse(url)
        .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ValidationError::ConstraintViolation(format!(
                "Invalid scheme '{}'. Must be one of: http, https",
                other
            )));
        }
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ValidationError::ConstraintViolation(
            "Base URL cannot carry a query string or fragment".to_string(),
        ));
    }

    Ok(())
}
