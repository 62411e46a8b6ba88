use crate::model::doctor::Doctor;
use crate::repository::mongo::DOCTORS;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::doc;
use tracing::{error, info, instrument};
use uuid::Uuid;

#[async_trait]
pub trait DoctorRepository: Send + Sync {
    async fn insert(&self, doctor: Doctor) -> RepositoryResult<Doctor>;
    async fn find_by_user_id(&self, user_id: &Uuid) -> RepositoryResult<Option<Doctor>>;
    async fn find_by_mobile_number(&self, mobile_number: &str) -> RepositoryResult<Option<Doctor>>;
}

pub struct MongoDoctorRepository {
    collection: mongodb::Collection<Doctor>,
}

impl MongoDoctorRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        MongoDoctorRepository { collection: db.collection::<Doctor>(DOCTORS) }
    }
}

#[async_trait]
impl DoctorRepository for MongoDoctorRepository {
    #[instrument(skip(self, doctor), fields(doctor_id = %doctor.id, user_id = %doctor.user_id))]
    async fn insert(&self, doctor: Doctor) -> RepositoryResult<Doctor> {
        match self.collection.insert_one(doctor.clone(), None).await {
            Ok(_) => {
                info!("Doctor profile inserted");
                Ok(doctor)
            }
            Err(e) => {
                error!("Failed to insert doctor: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    async fn find_by_user_id(&self, user_id: &Uuid) -> RepositoryResult<Option<Doctor>> {
        let filter = doc! { "user_id": user_id.to_string() };
        self.collection
            .find_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find doctor by user id: {}", e)))
    }

    async fn find_by_mobile_number(&self, mobile_number: &str) -> RepositoryResult<Option<Doctor>> {
        let filter = doc! { "mobile_number": mobile_number };
        self.collection
            .find_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find doctor by mobile number: {}", e)))
    }
}
