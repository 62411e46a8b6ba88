use std::borrow::Cow;

use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::{empty_as_none, required};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupForm {
    #[validate(
        custom(function = "validate_username"),
        length(max = 150, message = "Ensure this value has at most 150 characters.")
    )]
    pub username: String,
    #[validate(custom(function = "required"))]
    pub password1: String,
    #[validate(
        custom(function = "required"),
        must_match(other = "password1", message = "The two password fields didn't match.")
    )]
    pub password2: String,
    #[validate(
        custom(function = "required"),
        length(max = 255, message = "Ensure this value has at most 255 characters.")
    )]
    pub full_name: String,
    #[validate(
        custom(function = "required"),
        length(max = 20, message = "Ensure this value has at most 20 characters.")
    )]
    pub mobile_number: String,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(email(message = "Enter a valid email address."))]
    pub email_address: Option<String>,
    #[validate(
        custom(function = "required"),
        length(max = 255, message = "Ensure this value has at most 255 characters.")
    )]
    pub specialty: String,
    /// Kept as submitted text so a non-number is reported as a field error
    #[validate(custom(function = "validate_years_of_practice"))]
    pub years_of_practice: String,
    #[validate(
        custom(function = "required"),
        length(max = 255, message = "Ensure this value has at most 255 characters.")
    )]
    pub hospital_name: String,
    #[validate(
        custom(function = "required"),
        length(max = 255, message = "Ensure this value has at most 255 characters.")
    )]
    pub city_location: String,
}

impl SignupForm {
    /// Strips surrounding whitespace from every text field except the passwords.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.username,
            &mut self.full_name,
            &mut self.mobile_number,
            &mut self.specialty,
            &mut self.years_of_practice,
            &mut self.hospital_name,
            &mut self.city_location,
        ] {
            *field = field.trim().to_string();
        }
        self
    }

    /// Parsed years of practice; only meaningful once the form validated
    pub fn years(&self) -> i32 {
        self.years_of_practice.trim().parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(custom(function = "required"))]
    pub username: String,
    #[validate(custom(function = "required"))]
    pub password: String,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    required(username)?;
    let valid = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username").with_message(Cow::Borrowed(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        )))
    }
}

fn validate_years_of_practice(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    match value.trim().parse::<i32>() {
        Ok(years) if years >= 0 => Ok(()),
        Ok(_) => Err(ValidationError::new("min_value")
            .with_message(Cow::Borrowed("Ensure this value is greater than or equal to 0."))),
        Err(_) => Err(ValidationError::new("invalid").with_message(Cow::Borrowed("Enter a whole number."))),
    }
}
