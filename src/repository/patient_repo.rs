use crate::model::patient::Patient;
use crate::repository::mongo::PATIENTS;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::doc;
use futures::stream::StreamExt;
use mongodb::options::FindOptions;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn create(&self, patient: Patient) -> RepositoryResult<Patient>;
    async fn get_by_id(&self, id: &Uuid) -> RepositoryResult<Option<Patient>>;
    async fn update(&self, patient: Patient) -> RepositoryResult<Patient>;
    async fn delete(&self, id: &Uuid) -> RepositoryResult<()>;
    /// Patients of one doctor, newest `created_at` first
    async fn list_by_doctor(&self, doctor_id: &Uuid) -> RepositoryResult<Vec<Patient>>;
}

pub struct MongoPatientRepository {
    collection: mongodb::Collection<Patient>,
}

impl MongoPatientRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        MongoPatientRepository { collection: db.collection::<Patient>(PATIENTS) }
    }
}

#[async_trait]
impl PatientRepository for MongoPatientRepository {
    #[tracing::instrument(skip(self, patient), fields(patient_id = %patient.id, doctor_id = %patient.doctor_id))]
    async fn create(&self, patient: Patient) -> RepositoryResult<Patient> {
        let result = self.collection.insert_one(patient.clone(), None).await;
        match result {
            Ok(_) => {
                info!("Patient created successfully");
                Ok(patient)
            }
            Err(e) => {
                error!("Failed to create patient: {}", e);
                Err(RepositoryError::database(format!("Failed to create patient: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: &Uuid) -> RepositoryResult<Option<Patient>> {
        let filter = doc! { "_id": id.to_string() };
        self.collection.find_one(filter, None).await.map_err(|e| {
            error!("Failed to fetch patient by ID: {}", e);
            RepositoryError::database(format!("Failed to fetch patient by ID: {}", e))
        })
    }

    #[tracing::instrument(skip(self, patient), fields(id = %patient.id))]
    async fn update(&self, patient: Patient) -> RepositoryResult<Patient> {
        let filter = doc! { "_id": patient.id.to_string() };
        let result = self.collection.replace_one(filter, patient.clone(), None).await;
        match result {
            Ok(update_result) if update_result.matched_count > 0 => {
                info!("Patient updated successfully");
                Ok(patient)
            }
            Ok(_) => {
                error!("No patient found to update for ID: {}", patient.id);
                Err(RepositoryError::not_found(format!("No patient found to update for ID: {}", patient.id)))
            }
            Err(e) => {
                error!("Failed to update patient: {}", e);
                Err(RepositoryError::database(format!("Failed to update patient: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: &Uuid) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id.to_string() }, None).await;
        match result {
            Ok(delete_result) if delete_result.deleted_count > 0 => {
                info!("Patient deleted successfully for ID: {}", id);
                Ok(())
            }
            Ok(_) => {
                error!("No patient found to delete for ID: {}", id);
                Err(RepositoryError::not_found(format!("No patient found to delete for ID: {}", id)))
            }
            Err(e) => {
                error!("Failed to delete patient: {}", e);
                Err(RepositoryError::database(format!("Failed to delete patient: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(doctor_id = %doctor_id))]
    async fn list_by_doctor(&self, doctor_id: &Uuid) -> RepositoryResult<Vec<Patient>> {
        let filter = doc! { "doctor_id": doctor_id.to_string() };
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let mut cursor = self.collection.find(filter, options).await.map_err(|e| {
            error!("Failed to list patients: {}", e);
            RepositoryError::database(format!("Failed to list patients: {}", e))
        })?;

        let mut patients = Vec::new();
        while let Some(patient) = cursor.next().await {
            match patient {
                Ok(p) => patients.push(p),
                Err(e) => {
                    error!("Failed to deserialize patient: {}", e);
                    return Err(RepositoryError::serialization(format!("Failed to deserialize patient: {}", e)));
                }
            }
        }
        info!("Fetched {} patients", patients.len());
        Ok(patients)
    }
}
