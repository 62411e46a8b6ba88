pub mod auth_handler;
pub mod patient_handler;
