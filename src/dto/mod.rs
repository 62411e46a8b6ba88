pub mod auth_dto;
pub mod form_schema;
pub mod patient_dto;

use std::borrow::Cow;

use validator::ValidationError;

pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Rejects values that are empty once surrounding whitespace is removed.
pub fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed(REQUIRED_MESSAGE)));
    }
    Ok(())
}

/// Treats a blank form value as absent.
pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    Ok(value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
}
