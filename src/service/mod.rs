pub mod auth_service;
pub mod ownership;
pub mod patient_service;
