pub mod auth_router;
pub mod patient_router;
