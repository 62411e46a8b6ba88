use axum::extract::Multipart;
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, error};
use validator::Validate;

use super::{required, REQUIRED_MESSAGE};
use crate::util::error::{field_error, from_validation, merge_field_errors, FieldErrors, HandlerError};
use crate::util::media::ImageSlot;

pub const INVALID_IMAGE_MESSAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
pub const INVALID_JSON_MESSAGE: &str = "Invalid JSON format. Please check your syntax.";

/// One uploaded file part
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl ImageUpload {
    fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct PatientForm {
    #[validate(
        custom(function = "required"),
        length(max = 255, message = "Ensure this value has at most 255 characters.")
    )]
    pub product_name: String,
    #[validate(custom(function = "required"))]
    pub disease_name: String,
    #[validate(custom(function = "required"))]
    pub conditions_treated: String,
    #[validate(custom(function = "required"))]
    pub biochemistry_data: String,
    #[validate(custom(function = "required"))]
    pub medical_investigation: String,
    #[validate(custom(function = "required"))]
    pub improvements_observed: String,
    pub before_image: Option<ImageUpload>,
    pub after_image: Option<ImageUpload>,
}

impl PatientForm {
    /// Reads the multipart body. Unknown parts are ignored and an empty file
    /// part counts as no upload.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, HandlerError> {
        let mut form = PatientForm::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            error!("Failed to read multipart field: {}", e);
            HandlerError::bad_request(format!("Failed to read multipart field: {}", e))
        })? {
            let name = field.name().map(|s| s.to_string()).unwrap_or_default();
            let file_name = field.file_name().map(|s| s.to_string());
            let content_type = field.content_type().map(|s| s.to_string());
            let data = field.bytes().await.map_err(|e| {
                error!("Failed to read multipart field '{}': {}", name, e);
                HandlerError::bad_request(format!("Failed to read field '{}': {}", name, e))
            })?;

            match name.as_str() {
                "before_image" | "after_image" => {
                    if data.is_empty() {
                        continue;
                    }
                    debug!("Received image '{}' ({} bytes)", name, data.len());
                    let upload = Some(ImageUpload { file_name, content_type, data });
                    if name == "before_image" {
                        form.before_image = upload;
                    } else {
                        form.after_image = upload;
                    }
                }
                text_field => {
                    let value = String::from_utf8_lossy(&data).trim().to_string();
                    match text_field {
                        "product_name" => form.product_name = value,
                        "disease_name" => form.disease_name = value,
                        "conditions_treated" => form.conditions_treated = value,
                        "biochemistry_data" => form.biochemistry_data = value,
                        "medical_investigation" => form.medical_investigation = value,
                        "improvements_observed" => form.improvements_observed = value,
                        other => debug!("Ignoring unknown form field '{}'", other),
                    }
                }
            }
        }
        Ok(form)
    }

    /// Text field rules plus the image content type check
    pub fn validate_form(&self) -> Result<(), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => from_validation(&e),
        };
        for slot in [ImageSlot::Before, ImageSlot::After] {
            if self.image(slot).is_some_and(|upload| !upload.is_image()) {
                merge_field_errors(&mut errors, field_error(slot.field_name(), INVALID_IMAGE_MESSAGE));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn image(&self, slot: ImageSlot) -> Option<&ImageUpload> {
        match slot {
            ImageSlot::Before => self.before_image.as_ref(),
            ImageSlot::After => self.after_image.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateForm {
    pub update_data: String,
}

impl UpdateForm {
    /// The submitted text parsed as JSON
    pub fn parse(&self) -> Result<serde_json::Value, FieldErrors> {
        if self.update_data.trim().is_empty() {
            return Err(field_error("update_data", REQUIRED_MESSAGE));
        }
        serde_json::from_str(&self.update_data).map_err(|e| {
            debug!("Rejected update payload: {}", e);
            field_error("update_data", INVALID_JSON_MESSAGE)
        })
    }
}
