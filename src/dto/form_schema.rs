//! Field descriptions returned by the form pages in place of rendered HTML.

use serde::Serialize;

use crate::model::patient::Patient;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    Password,
    Email,
    Integer,
    Image,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<&'static str>,
}

impl FormField {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        FormField { name, kind, required: true, max_length: None, help_text: None }
    }

    fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn max(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    fn help(mut self, text: &'static str) -> Self {
        self.help_text = Some(text);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormSchema {
    pub action: String,
    pub method: &'static str,
    pub enctype: &'static str,
    pub fields: Vec<FormField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<serde_json::Value>,
}

const URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

impl FormSchema {
    fn post(action: impl Into<String>, enctype: &'static str, fields: Vec<FormField>) -> Self {
        FormSchema { action: action.into(), method: "POST", enctype, fields, initial: None }
    }

    pub fn signup() -> Self {
        use FieldKind::*;
        FormSchema::post(
            "/signup/",
            URLENCODED,
            vec![
                FormField::new("username", Text).max(150).help("Use your mobile number as username"),
                FormField::new("password1", Password).help("At least 8 characters"),
                FormField::new("password2", Password).help("Enter the same password as before, for verification."),
                FormField::new("full_name", Text).max(255),
                FormField::new("mobile_number", Text).max(20),
                FormField::new("email_address", Email).optional(),
                FormField::new("specialty", Text).max(255),
                FormField::new("years_of_practice", Integer),
                FormField::new("hospital_name", Text).max(255),
                FormField::new("city_location", Text).max(255),
            ],
        )
    }

    pub fn login() -> Self {
        FormSchema::post(
            "/login/",
            URLENCODED,
            vec![
                FormField::new("username", FieldKind::Text).max(150),
                FormField::new("password", FieldKind::Password),
            ],
        )
    }

    /// Patient form posting to `action`, pre-filled from `patient` when editing
    pub fn patient(action: impl Into<String>, patient: Option<&Patient>) -> Self {
        use FieldKind::*;
        let mut schema = FormSchema::post(
            action,
            MULTIPART,
            vec![
                FormField::new("product_name", Text).max(255),
                FormField::new("disease_name", Textarea),
                FormField::new("conditions_treated", Textarea)
                    .help("Enter conditions separated by commas (e.g., Diabetes, Hypertension, Obesity)"),
                FormField::new("biochemistry_data", Textarea),
                FormField::new("medical_investigation", Textarea),
                FormField::new("improvements_observed", Textarea),
                FormField::new("before_image", Image).optional(),
                FormField::new("after_image", Image).optional(),
            ],
        );
        schema.initial = patient.map(|p| {
            serde_json::json!({
                "product_name": p.product_name,
                "disease_name": p.disease_name,
                "conditions_treated": p.conditions_treated,
                "biochemistry_data": p.biochemistry_data,
                "medical_investigation": p.medical_investigation,
                "improvements_observed": p.improvements_observed,
                "before_image": p.before_image,
                "after_image": p.after_image,
            })
        });
        schema
    }

    pub fn update(action: impl Into<String>) -> Self {
        FormSchema::post(
            action,
            URLENCODED,
            vec![FormField::new("update_data", FieldKind::Json).help(
                "Enter update data as JSON. Example: {\"date\": \"2025-10-28\", \"improvements\": \"Significant improvement\", \"notes\": \"Patient responding well\"}",
            )],
        )
    }
}
