pub mod doctor;
pub mod patient;
pub mod patient_update;
pub mod user;
