use std::collections::BTreeMap;

use axum::{http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use tracing::error;

use crate::repository::repository_error::RepositoryError;
use crate::util::flash::FlashRedirect;

/// Field name to the messages reported against it. Form-wide errors use `__all__`.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const NON_FIELD_ERRORS: &str = "__all__";
pub const FORM_ERROR_MESSAGE: &str = "Please correct the errors below.";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password.";
pub const MISSING_PROFILE_MESSAGE: &str = "Doctor profile not found.";

pub fn field_error(field: &str, message: impl Into<String>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message.into()]);
    errors
}

/// Flattens `validator` output, falling back to the error code when a rule has no message.
pub fn from_validation(errors: &validator::ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

/// Adds `more` to `errors`, keeping messages already recorded for a field first.
pub fn merge_field_errors(errors: &mut FieldErrors, more: FieldErrors) {
    for (field, messages) in more {
        errors.entry(field).or_default().extend(messages);
    }
}

#[derive(Debug, Serialize)]
pub enum HandlerErrorKind {
    NotFound,
    Validation,
    Internal,
    Unauthorized,
    MissingProfile,
    BadRequest,
}

impl std::fmt::Display for HandlerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HandlerErrorKind::NotFound => "NotFound",
            HandlerErrorKind::Validation => "Validation",
            HandlerErrorKind::Internal => "Internal",
            HandlerErrorKind::Unauthorized => "Unauthorized",
            HandlerErrorKind::MissingProfile => "MissingProfile",
            HandlerErrorKind::BadRequest => "BadRequest",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Serialize)]
pub struct HandlerError {
    pub error: HandlerErrorKind,
    pub message: String,
    pub details: Option<String>,
    pub fields: Option<FieldErrors>,
}

impl HandlerError {
    pub fn new(error: HandlerErrorKind, message: impl Into<String>) -> Self {
        HandlerError { error, message: message.into(), details: None, fields: None }
    }

    pub fn not_found() -> Self {
        HandlerError::new(HandlerErrorKind::NotFound, "Not found")
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        HandlerError::new(HandlerErrorKind::Unauthorized, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        HandlerError::new(HandlerErrorKind::BadRequest, message)
    }

    pub fn validation(message: impl Into<String>, fields: FieldErrors) -> Self {
        HandlerError { fields: Some(fields), ..HandlerError::new(HandlerErrorKind::Validation, message) }
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for HandlerError {}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = match self.error {
            HandlerErrorKind::NotFound => StatusCode::NOT_FOUND,
            HandlerErrorKind::Validation | HandlerErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            HandlerErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            HandlerErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            HandlerErrorKind::MissingProfile => {
                return FlashRedirect::error("/login/", self.message).into_response();
            }
        };
        let body = axum::Json(self);
        (status, body).into_response()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Doctor profile not found")]
    MissingProfile,
    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl ServiceError {
    pub fn internal(err: impl std::fmt::Display) -> Self {
        ServiceError::InternalError(err.to_string())
    }
}

// Allow conversion from RepositoryError to ServiceError
impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
            RepositoryError::AlreadyExists { field, .. } => {
                let field = field.unwrap_or_else(|| NON_FIELD_ERRORS.to_string());
                let message = format!("A record with this {} already exists.", field.replace('_', " "));
                ServiceError::Validation(field_error(&field, message))
            }
            other => ServiceError::InternalError(other.to_string()),
        }
    }
}

impl From<ServiceError> for HandlerError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => HandlerError {
                details: Some(msg),
                ..HandlerError::not_found()
            },
            ServiceError::Validation(fields) => HandlerError::validation(FORM_ERROR_MESSAGE, fields),
            ServiceError::InvalidCredentials => HandlerError::validation(
                INVALID_CREDENTIALS_MESSAGE,
                field_error(NON_FIELD_ERRORS, INVALID_CREDENTIALS_MESSAGE),
            ),
            ServiceError::Unauthorized(msg) => HandlerError::unauthorized(msg),
            ServiceError::MissingProfile => {
                HandlerError::new(HandlerErrorKind::MissingProfile, MISSING_PROFILE_MESSAGE)
            }
            ServiceError::InternalError(msg) => {
                error!("Internal error: {}", msg);
                HandlerError::new(HandlerErrorKind::Internal, "Internal server error")
            }
        }
    }
}
