use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::dto::patient_dto::{PatientForm, UpdateForm};
use crate::model::doctor::Doctor;
use crate::model::patient::Patient;
use crate::model::patient_update::PatientUpdate;
use crate::repository::patient_repo::PatientRepository;
use crate::repository::patient_update_repo::PatientUpdateRepository;
use crate::service::ownership::assert_owns;
use crate::util::error::ServiceError;
use crate::util::media::{image_key, ImageSlot, MediaStore};
use crate::util::serde_fields::now;

/// A patient with links to its stored images
#[derive(Debug, Clone, Serialize)]
pub struct PatientView {
    #[serde(flatten)]
    pub patient: Patient,
    pub before_image_url: Option<String>,
    pub after_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub doctor: Doctor,
    pub patients: Vec<PatientView>,
    pub total_patients: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientDetailView {
    pub doctor: Doctor,
    pub patient: PatientView,
    pub updates: Vec<PatientUpdate>,
    pub conditions: Vec<String>,
}

#[async_trait]
pub trait PatientService: Send + Sync {
    async fn dashboard(&self, doctor: &Doctor) -> Result<DashboardView, ServiceError>;
    async fn create_patient(&self, doctor: &Doctor, form: PatientForm) -> Result<Patient, ServiceError>;
    async fn get_patient(&self, doctor: &Doctor, patient_id: Uuid) -> Result<PatientView, ServiceError>;
    async fn patient_detail(&self, doctor: &Doctor, patient_id: Uuid) -> Result<PatientDetailView, ServiceError>;
    async fn edit_patient(&self, doctor: &Doctor, patient_id: Uuid, form: PatientForm) -> Result<Patient, ServiceError>;
    /// Removes the patient together with its updates and images
    async fn delete_patient(&self, doctor: &Doctor, patient_id: Uuid) -> Result<(), ServiceError>;
    async fn add_update(&self, doctor: &Doctor, patient_id: Uuid, form: UpdateForm) -> Result<PatientUpdate, ServiceError>;
    /// Returns the id of the patient the update belonged to
    async fn delete_update(&self, doctor: &Doctor, update_id: Uuid) -> Result<Uuid, ServiceError>;
}

pub struct PatientServiceImpl {
    pub patient_repo: Arc<dyn PatientRepository>,
    pub update_repo: Arc<dyn PatientUpdateRepository>,
    pub media: Arc<dyn MediaStore>,
}

impl PatientServiceImpl {
    pub fn new(
        patient_repo: Arc<dyn PatientRepository>,
        update_repo: Arc<dyn PatientUpdateRepository>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self { patient_repo, update_repo, media }
    }

    async fn owned_patient(&self, doctor: &Doctor, patient_id: Uuid) -> Result<Patient, ServiceError> {
        let patient = self.patient_repo.get_by_id(&patient_id).await?;
        assert_owns(doctor, patient)
    }

    fn view(&self, patient: Patient) -> PatientView {
        PatientView {
            before_image_url: patient.before_image.as_deref().map(|key| self.media.url(key)),
            after_image_url: patient.after_image.as_deref().map(|key| self.media.url(key)),
            patient,
        }
    }

    /// Writes every uploaded image, returning the new key per slot.
    /// On failure the images already written are removed again.
    async fn store_images(&self, form: &PatientForm) -> Result<(Option<String>, Option<String>), ServiceError> {
        let mut before = None;
        let mut after = None;
        for slot in [ImageSlot::Before, ImageSlot::After] {
            let Some(upload) = form.image(slot) else {
                continue;
            };
            let key = image_key(slot, upload.file_name.as_deref());
            if let Err(e) = self.media.put(&key, upload.data.clone(), upload.content_type.as_deref()).await {
                error!("Failed to store {} image: {}", slot.field_name(), e);
                self.discard_images(before.iter().map(String::as_str)).await;
                return Err(ServiceError::internal(e));
            }
            match slot {
                ImageSlot::Before => before = Some(key),
                ImageSlot::After => after = Some(key),
            }
        }
        Ok((before, after))
    }

    /// Failures are logged and leave the object behind.
    async fn discard_images<'a>(&self, keys: impl Iterator<Item = &'a str> + Send) {
        for key in keys {
            if let Err(e) = self.media.remove(key).await {
                warn!("Failed to remove image '{}': {}", key, e);
            }
        }
    }
}

#[async_trait]
impl PatientService for PatientServiceImpl {
    #[instrument(skip(self, doctor), fields(doctor_id = %doctor.id))]
    async fn dashboard(&self, doctor: &Doctor) -> Result<DashboardView, ServiceError> {
        let patients = self.patient_repo.list_by_doctor(&doctor.id).await?;
        let patients: Vec<PatientView> = patients.into_iter().map(|p| self.view(p)).collect();
        Ok(DashboardView { doctor: doctor.clone(), total_patients: patients.len(), patients })
    }

    #[instrument(skip(self, doctor, form), fields(doctor_id = %doctor.id))]
    async fn create_patient(&self, doctor: &Doctor, form: PatientForm) -> Result<Patient, ServiceError> {
        form.validate_form().map_err(ServiceError::Validation)?;
        let (before_image, after_image) = self.store_images(&form).await?;

        let at = now();
        let patient = Patient {
            id: Uuid::new_v4(),
            doctor_id: doctor.id,
            product_name: form.product_name,
            disease_name: form.disease_name,
            conditions_treated: form.conditions_treated,
            biochemistry_data: form.biochemistry_data,
            medical_investigation: form.medical_investigation,
            improvements_observed: form.improvements_observed,
            before_image: before_image.clone(),
            after_image: after_image.clone(),
            created_at: at,
            updated_at: at,
        };

        let res = self.patient_repo.create(patient).await;
        match &res {
            Ok(p) => info!(patient_id = %p.id, "Patient created"),
            Err(e) => {
                error!("Failed to create patient: {}", e);
                let images = [before_image.as_deref(), after_image.as_deref()];
                self.discard_images(images.into_iter().flatten()).await;
            }
        }
        Ok(res?)
    }

    async fn get_patient(&self, doctor: &Doctor, patient_id: Uuid) -> Result<PatientView, ServiceError> {
        let patient = self.owned_patient(doctor, patient_id).await?;
        Ok(self.view(patient))
    }

    #[instrument(skip(self, doctor), fields(doctor_id = %doctor.id))]
    async fn patient_detail(&self, doctor: &Doctor, patient_id: Uuid) -> Result<PatientDetailView, ServiceError> {
        let patient = self.owned_patient(doctor, patient_id).await?;
        let updates = self.update_repo.list_by_patient(&patient.id).await?;
        let conditions = patient.conditions_list();
        Ok(PatientDetailView { doctor: doctor.clone(), patient: self.view(patient), updates, conditions })
    }

    #[instrument(skip(self, doctor, form), fields(doctor_id = %doctor.id))]
    async fn edit_patient(&self, doctor: &Doctor, patient_id: Uuid, form: PatientForm) -> Result<Patient, ServiceError> {
        let mut patient = self.owned_patient(doctor, patient_id).await?;
        form.validate_form().map_err(ServiceError::Validation)?;
        let (before_image, after_image) = self.store_images(&form).await?;

        let mut replaced = Vec::new();
        if let Some(key) = before_image.clone() {
            replaced.extend(patient.before_image.replace(key));
        }
        if let Some(key) = after_image.clone() {
            replaced.extend(patient.after_image.replace(key));
        }
        patient.product_name = form.product_name;
        patient.disease_name = form.disease_name;
        patient.conditions_treated = form.conditions_treated;
        patient.biochemistry_data = form.biochemistry_data;
        patient.medical_investigation = form.medical_investigation;
        patient.improvements_observed = form.improvements_observed;
        patient.updated_at = now();

        let patient = match self.patient_repo.update(patient).await {
            Ok(patient) => patient,
            Err(e) => {
                error!("Failed to update patient {}: {}", patient_id, e);
                let stored = [before_image.as_deref(), after_image.as_deref()];
                self.discard_images(stored.into_iter().flatten()).await;
                return Err(e.into());
            }
        };
        self.discard_images(replaced.iter().map(String::as_str)).await;
        info!(patient_id = %patient.id, replaced_images = replaced.len(), "Patient updated");
        Ok(patient)
    }

    #[instrument(skip(self, doctor), fields(doctor_id = %doctor.id))]
    async fn delete_patient(&self, doctor: &Doctor, patient_id: Uuid) -> Result<(), ServiceError> {
        let patient = self.owned_patient(doctor, patient_id).await?;
        let removed_updates = self.update_repo.delete_by_patient(&patient.id).await?;
        self.patient_repo.delete(&patient.id).await?;
        let images = [patient.before_image.as_deref(), patient.after_image.as_deref()];
        self.discard_images(images.into_iter().flatten()).await;
        info!(patient_id = %patient.id, removed_updates, "Patient deleted");
        Ok(())
    }

    #[instrument(skip(self, doctor, form), fields(doctor_id = %doctor.id))]
    async fn add_update(&self, doctor: &Doctor, patient_id: Uuid, form: UpdateForm) -> Result<PatientUpdate, ServiceError> {
        let patient = self.owned_patient(doctor, patient_id).await?;
        let update_data = form.parse().map_err(ServiceError::Validation)?;
        let update = PatientUpdate { id: Uuid::new_v4(), patient_id: patient.id, update_data, updated_at: now() };
        let update = self.update_repo.create(update).await?;
        info!(patient_id = %patient.id, update_id = %update.id, "Patient update added");
        Ok(update)
    }

    #[instrument(skip(self, doctor), fields(doctor_id = %doctor.id))]
    async fn delete_update(&self, doctor: &Doctor, update_id: Uuid) -> Result<Uuid, ServiceError> {
        let not_found = || ServiceError::NotFound("Patient update not found".to_string());
        let update = self.update_repo.get_by_id(&update_id).await?.ok_or_else(not_found)?;
        let patient = self.patient_repo.get_by_id(&update.patient_id).await?;
        let patient = assert_owns(doctor, patient).map_err(|_| not_found())?;
        self.update_repo.delete(&update.id).await?;
        info!(patient_id = %patient.id, update_id = %update.id, "Patient update deleted");
        Ok(patient.id)
    }
}
