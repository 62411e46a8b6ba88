use crate::model::patient_update::PatientUpdate;
use crate::repository::mongo::PATIENT_UPDATES;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::doc;
use futures::stream::StreamExt;
use mongodb::options::FindOptions;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait PatientUpdateRepository: Send + Sync {
    async fn create(&self, update: PatientUpdate) -> RepositoryResult<PatientUpdate>;
    async fn get_by_id(&self, id: &Uuid) -> RepositoryResult<Option<PatientUpdate>>;
    async fn delete(&self, id: &Uuid) -> RepositoryResult<()>;
    /// Removes every update of a patient, returning how many went
    async fn delete_by_patient(&self, patient_id: &Uuid) -> RepositoryResult<u64>;
    /// Updates of one patient, newest `updated_at` first
    async fn list_by_patient(&self, patient_id: &Uuid) -> RepositoryResult<Vec<PatientUpdate>>;
}

pub struct MongoPatientUpdateRepository {
    collection: mongodb::Collection<PatientUpdate>,
}

impl MongoPatientUpdateRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        MongoPatientUpdateRepository { collection: db.collection::<PatientUpdate>(PATIENT_UPDATES) }
    }
}

#[async_trait]
impl PatientUpdateRepository for MongoPatientUpdateRepository {
    #[tracing::instrument(skip(self, update), fields(update_id = %update.id, patient_id = %update.patient_id))]
    async fn create(&self, update: PatientUpdate) -> RepositoryResult<PatientUpdate> {
        let result = self.collection.insert_one(update.clone(), None).await;
        match result {
            Ok(_) => {
                info!("Patient update created successfully");
                Ok(update)
            }
            Err(e) => {
                error!("Failed to create patient update: {}", e);
                Err(RepositoryError::database(format!("Failed to create patient update: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: &Uuid) -> RepositoryResult<Option<PatientUpdate>> {
        let filter = doc! { "_id": id.to_string() };
        self.collection.find_one(filter, None).await.map_err(|e| {
            error!("Failed to fetch patient update by ID: {}", e);
            RepositoryError::database(format!("Failed to fetch patient update by ID: {}", e))
        })
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: &Uuid) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id.to_string() }, None).await;
        match result {
            Ok(delete_result) if delete_result.deleted_count > 0 => {
                info!("Patient update deleted successfully for ID: {}", id);
                Ok(())
            }
            Ok(_) => {
                error!("No patient update found to delete for ID: {}", id);
                Err(RepositoryError::not_found(format!("No patient update found to delete for ID: {}", id)))
            }
            Err(e) => {
                error!("Failed to delete patient update: {}", e);
                Err(RepositoryError::database(format!("Failed to delete patient update: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(patient_id = %patient_id))]
    async fn delete_by_patient(&self, patient_id: &Uuid) -> RepositoryResult<u64> {
        let filter = doc! { "patient_id": patient_id.to_string() };
        match self.collection.delete_many(filter, None).await {
            Ok(result) => {
                info!("Deleted {} updates of patient {}", result.deleted_count, patient_id);
                Ok(result.deleted_count)
            }
            Err(e) => {
                error!("Failed to delete patient updates: {}", e);
                Err(RepositoryError::database(format!("Failed to delete patient updates: {}", e)))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(patient_id = %patient_id))]
    async fn list_by_patient(&self, patient_id: &Uuid) -> RepositoryResult<Vec<PatientUpdate>> {
        let filter = doc! { "patient_id": patient_id.to_string() };
        let options = FindOptions::builder().sort(doc! { "updated_at": -1 }).build();
        let mut cursor = self.collection.find(filter, options).await.map_err(|e| {
            error!("Failed to list patient updates: {}", e);
            RepositoryError::database(format!("Failed to list patient updates: {}", e))
        })?;

        let mut updates = Vec::new();
        while let Some(update) = cursor.next().await {
            match update {
                Ok(u) => updates.push(u),
                Err(e) => {
                    error!("Failed to deserialize patient update: {}", e);
                    return Err(RepositoryError::serialization(format!("Failed to deserialize patient update: {}", e)));
                }
            }
        }
        Ok(updates)
    }
}
