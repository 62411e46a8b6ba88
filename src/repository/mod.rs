pub mod doctor_repo;
pub mod memory_repo;
pub mod mongo;
pub mod patient_repo;
pub mod patient_update_repo;
pub mod repository_error;
pub mod user_repo;
