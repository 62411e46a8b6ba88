//! In-process store implementing every repository trait.
//!
//! Selected with `STORAGE_BACKEND=memory` and used by the integration tests.
//! Mirrors the unique indexes the Mongo backend creates.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::model::doctor::Doctor;
use crate::model::patient::Patient;
use crate::model::patient_update::PatientUpdate;
use crate::model::user::User;
use crate::repository::doctor_repo::DoctorRepository;
use crate::repository::patient_repo::PatientRepository;
use crate::repository::patient_update_repo::PatientUpdateRepository;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::user_repo::UserRepository;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    doctors: Vec<Doctor>,
    patients: Vec<Patient>,
    updates: Vec<PatientUpdate>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Row counts as `(users, doctors, patients, updates)`
    pub async fn counts(&self) -> (usize, usize, usize, usize) {
        let t = self.tables.read().await;
        (t.users.len(), t.doctors.len(), t.patients.len(), t.updates.len())
    }
}

/// Newest first; rows sharing a timestamp keep reverse insertion order.
fn newest_first<T: Clone, K: Ord>(rows: impl Iterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut out: Vec<T> = rows.collect();
    out.reverse();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: User) -> RepositoryResult<User> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.username == user.username) {
            return Err(RepositoryError::already_exists(
                "username",
                format!("Username {} already exists", user.username),
            ));
        }
        t.users.push(user.clone());
        info!(user_id = %user.id, "User inserted");
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn delete(&self, id: &Uuid) -> RepositoryResult<()> {
        let mut t = self.tables.write().await;
        let before = t.users.len();
        t.users.retain(|u| &u.id != id);
        if t.users.len() == before {
            return Err(RepositoryError::not_found(format!("No user found to delete for ID: {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl DoctorRepository for MemoryStore {
    async fn insert(&self, doctor: Doctor) -> RepositoryResult<Doctor> {
        let mut t = self.tables.write().await;
        if t.doctors.iter().any(|d| d.mobile_number == doctor.mobile_number) {
            return Err(RepositoryError::already_exists(
                "mobile_number",
                format!("Mobile number {} already registered", doctor.mobile_number),
            ));
        }
        if t.doctors.iter().any(|d| d.user_id == doctor.user_id) {
            return Err(RepositoryError::already_exists(
                "user_id",
                format!("User {} already has a doctor profile", doctor.user_id),
            ));
        }
        t.doctors.push(doctor.clone());
        info!(doctor_id = %doctor.id, "Doctor profile inserted");
        Ok(doctor)
    }

    async fn find_by_user_id(&self, user_id: &Uuid) -> RepositoryResult<Option<Doctor>> {
        let t = self.tables.read().await;
        Ok(t.doctors.iter().find(|d| &d.user_id == user_id).cloned())
    }

    async fn find_by_mobile_number(&self, mobile_number: &str) -> RepositoryResult<Option<Doctor>> {
        let t = self.tables.read().await;
        Ok(t.doctors.iter().find(|d| d.mobile_number == mobile_number).cloned())
    }
}

#[async_trait]
impl PatientRepository for MemoryStore {
    async fn create(&self, patient: Patient) -> RepositoryResult<Patient> {
        let mut t = self.tables.write().await;
        if t.patients.iter().any(|p| p.id == patient.id) {
            return Err(RepositoryError::already_exists("_id", format!("Patient {} already exists", patient.id)));
        }
        t.patients.push(patient.clone());
        Ok(patient)
    }

    async fn get_by_id(&self, id: &Uuid) -> RepositoryResult<Option<Patient>> {
        let t = self.tables.read().await;
        Ok(t.patients.iter().find(|p| &p.id == id).cloned())
    }

    async fn update(&self, patient: Patient) -> RepositoryResult<Patient> {
        let mut t = self.tables.write().await;
        match t.patients.iter_mut().find(|p| p.id == patient.id) {
            Some(slot) => {
                *slot = patient.clone();
                Ok(patient)
            }
            None => Err(RepositoryError::not_found(format!("No patient found to update for ID: {}", patient.id))),
        }
    }

    async fn delete(&self, id: &Uuid) -> RepositoryResult<()> {
        let mut t = self.tables.write().await;
        let before = t.patients.len();
        t.patients.retain(|p| &p.id != id);
        if t.patients.len() == before {
            return Err(RepositoryError::not_found(format!("No patient found to delete for ID: {}", id)));
        }
        Ok(())
    }

    async fn list_by_doctor(&self, doctor_id: &Uuid) -> RepositoryResult<Vec<Patient>> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.patients.iter().filter(|p| &p.doctor_id == doctor_id).cloned(),
            |p| p.created_at,
        ))
    }
}

#[async_trait]
impl PatientUpdateRepository for MemoryStore {
    async fn create(&self, update: PatientUpdate) -> RepositoryResult<PatientUpdate> {
        let mut t = self.tables.write().await;
        t.updates.push(update.clone());
        Ok(update)
    }

    async fn get_by_id(&self, id: &Uuid) -> RepositoryResult<Option<PatientUpdate>> {
        let t = self.tables.read().await;
        Ok(t.updates.iter().find(|u| &u.id == id).cloned())
    }

    async fn delete(&self, id: &Uuid) -> RepositoryResult<()> {
        let mut t = self.tables.write().await;
        let before = t.updates.len();
        t.updates.retain(|u| &u.id != id);
        if t.updates.len() == before {
            return Err(RepositoryError::not_found(format!("No patient update found to delete for ID: {}", id)));
        }
        Ok(())
    }

    async fn delete_by_patient(&self, patient_id: &Uuid) -> RepositoryResult<u64> {
        let mut t = self.tables.write().await;
        let before = t.updates.len();
        t.updates.retain(|u| &u.patient_id != patient_id);
        Ok((before - t.updates.len()) as u64)
    }

    async fn list_by_patient(&self, patient_id: &Uuid) -> RepositoryResult<Vec<PatientUpdate>> {
        let t = self.tables.read().await;
        Ok(newest_first(
            t.updates.iter().filter(|u| &u.patient_id == patient_id).cloned(),
            |u| u.updated_at,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::serde_fields::now;
    use chrono::Duration;

    fn user(name: &str) -> User {
        let at = now();
        User { id: Uuid::new_v4(), username: name.to_string(), password_hash: "x".into(), created_at: at, updated_at: at }
    }

    fn update(patient_id: Uuid, at: chrono::DateTime<chrono::Utc>, n: i64) -> PatientUpdate {
        PatientUpdate { id: Uuid::new_v4(), patient_id, update_data: serde_json::json!({ "n": n }), updated_at: at }
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let store = MemoryStore::new();
        UserRepository::insert(&store, user("drsmith")).await.unwrap();
        let err = UserRepository::insert(&store, user("drsmith")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists { field: Some(ref f), .. } if f == "username"));
        assert_eq!(store.counts().await.0, 1);
    }

    #[tokio::test]
    async fn test_updates_listed_newest_first() {
        let store = MemoryStore::new();
        let patient_id = Uuid::new_v4();
        let base = now();
        PatientUpdateRepository::create(&store, update(patient_id, base, 1)).await.unwrap();
        PatientUpdateRepository::create(&store, update(patient_id, base + Duration::seconds(5), 2)).await.unwrap();
        PatientUpdateRepository::create(&store, update(patient_id, base, 3)).await.unwrap();
        PatientUpdateRepository::create(&store, update(Uuid::new_v4(), base, 4)).await.unwrap();

        let listed = store.list_by_patient(&patient_id).await.unwrap();
        let order: Vec<i64> = listed.iter().map(|u| u.update_data["n"].as_i64().unwrap()).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_delete_by_patient_counts_rows() {
        let store = MemoryStore::new();
        let patient_id = Uuid::new_v4();
        PatientUpdateRepository::create(&store, update(patient_id, now(), 1)).await.unwrap();
        PatientUpdateRepository::create(&store, update(patient_id, now(), 2)).await.unwrap();
        assert_eq!(store.delete_by_patient(&patient_id).await.unwrap(), 2);
        assert!(store.list_by_patient(&patient_id).await.unwrap().is_empty());
    }
}
