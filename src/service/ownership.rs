//! The single authorization check for doctor-owned records.

use tracing::warn;
use uuid::Uuid;

use crate::model::doctor::Doctor;
use crate::model::patient::Patient;
use crate::util::error::ServiceError;

/// A record that belongs to exactly one doctor
pub trait Owned {
    const KIND: &'static str;
    fn owner_id(&self) -> Uuid;
    fn id(&self) -> Uuid;
}

impl Owned for Patient {
    const KIND: &'static str = "Patient";

    fn owner_id(&self) -> Uuid {
        self.doctor_id
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Passes `resource` through when `doctor` owns it.
///
/// A missing record and one owned by another doctor produce the same
/// `NotFound`, so callers cannot probe for ids outside their scope.
pub fn assert_owns<R: Owned>(doctor: &Doctor, resource: Option<R>) -> Result<R, ServiceError> {
    match resource {
        Some(resource) if resource.owner_id() == doctor.id => Ok(resource),
        Some(resource) => {
            warn!(doctor_id = %doctor.id, resource_id = %resource.id(), "{} outside doctor scope", R::KIND);
            Err(ServiceError::NotFound(format!("{} not found", R::KIND)))
        }
        None => Err(ServiceError::NotFound(format!("{} not found", R::KIND))),
    }
}
