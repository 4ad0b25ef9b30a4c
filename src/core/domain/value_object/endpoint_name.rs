use crate::core::domain::error::ValidationError;

const MAX_NAME_LENGTH: usize = 64;

/// Validates the display name of an endpoint.
pub(crate) fn validate_endpoint_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Field {
            field: "name".to_string(),
            message: "Name cannot be empty".to_string(),
        });
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::Format(format!(
            "Name cannot exceed {} characters",
            MAX_NAME_LENGTH
        )));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(ValidationError::Format(
            "Name cannot contain control characters".to_string(),
        ));
    }
    Ok(())
}
