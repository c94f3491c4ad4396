use thiserror::Error;

/// The main error type for capacity operations.
///
/// This enum represents all possible errors that can occur while talking
/// to the panel API or validating client configuration. Capacity answers
/// themselves ("cannot accommodate", "no data") are not errors; they are
/// expressed in the result types of the monitor and calculator services.
#[derive(Error, Debug)]
pub enum CapacityError {
    /// Represents errors that occur while reaching the panel API
    ///
    /// # Fields
    /// * `0` - A description of what went wrong during the request
    #[error("Connection error: {0}")]
    Connection(String),

    /// Represents authentication failures against the panel API
    ///
    /// # Fields
    /// * `0` - A description of the authentication failure
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Represents validation failures with detailed context
    ///
    /// # Fields
    /// * `0` - The underlying validation error
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for Results that may fail with a CapacityError
pub type CapacityResult<T> = Result<T, CapacityError>;
