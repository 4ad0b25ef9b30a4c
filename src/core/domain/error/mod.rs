use thiserror::Error;

/// The main error type for supervisor operations.
///
/// Every variant is non-fatal: it is scoped to the view that triggered it and
/// carries enough text to render an explanatory panel.
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// A required configuration value is absent
    ///
    /// # Fields
    /// * `field` - The name of the missing value (e.g. `api_key`, `api_token`)
    #[error("Missing configuration: {field}")]
    ConfigurationMissing { field: String },

    /// A referenced entity no longer exists
    ///
    /// # Fields
    /// * `0` - Identifier of the vanished entity
    #[error("Configuration is stale: {0}")]
    ConfigurationStale(String),

    /// The text-generation service rejected the credential
    ///
    /// # Fields
    /// * `0` - The message reported by the service
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// The text-generation service failed or could not be reached
    ///
    /// # Fields
    /// * `0` - A description of the failure
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Unexpected failure while processing data locally
    ///
    /// # Fields
    /// * `0` - A description of what went wrong
    #[error("Processing error: {0}")]
    Processing(String),

    /// Durable key-value storage could not be read or written
    ///
    /// # Fields
    /// * `0` - A description of the storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Represents validation failures with detailed context
    ///
    /// # Fields
    /// * `source` - The underlying validation error
    #[error("Validation error: {source}")]
    Validation {
        #[source]
        source: ValidationError,
    },
}

impl From<ValidationError> for SupervisorError {
    fn from(error: ValidationError) -> Self {
        SupervisorError::Validation { source: error }
    }
}

/// The four error families the presentation layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A required field is absent or invalid
    ConfigurationMissing,
    /// A referenced entity no longer exists
    ConfigurationStale,
    /// The generative-text call failed or the credential is invalid
    ExternalServiceUnavailable,
    /// Unexpected local failure
    ProcessingFailure,
}

impl SupervisorError {
    /// Maps the error onto its user-facing family.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SupervisorError::ConfigurationMissing { .. } | SupervisorError::Validation { .. } => {
                ErrorCategory::ConfigurationMissing
            }
            SupervisorError::ConfigurationStale(_) => ErrorCategory::ConfigurationStale,
            SupervisorError::InvalidCredential(_) | SupervisorError::ExternalService(_) => {
                ErrorCategory::ExternalServiceUnavailable
            }
            SupervisorError::Processing(_) | SupervisorError::Storage(_) => {
                ErrorCategory::ProcessingFailure
            }
        }
    }

    /// Returns `true` when the text-generation service refused the API key.
    pub fn is_invalid_credential(&self) -> bool {
        matches!(self, SupervisorError::InvalidCredential(_))
    }

    /// Explanatory text suitable for an error panel or a system chat message.
    pub fn user_message(&self) -> String {
        match self {
            SupervisorError::ConfigurationMissing { field } if field == "api_key" => {
                "Gemini API key not configured. Please set it in Settings.".to_string()
            }
            SupervisorError::ConfigurationMissing { field } => {
                format!("Configuration incomplete: '{}' is required.", field)
            }
            SupervisorError::ConfigurationStale(_) => {
                "Selected instance configuration not found.".to_string()
            }
            SupervisorError::InvalidCredential(_) => {
                "Error: The Gemini API key is invalid or not configured correctly. Please check your API key."
                    .to_string()
            }
            SupervisorError::ExternalService(_) => {
                "Sorry, I encountered an error trying to process your request.".to_string()
            }
            SupervisorError::Processing(_) | SupervisorError::Storage(_) => {
                "Failed to process data for instance.".to_string()
            }
            SupervisorError::Validation { source } => source.to_string(),
        }
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
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

/// Type alias for Results that may fail with a SupervisorError
pub type SupervisorResult<T> = Result<T, SupervisorError>;
