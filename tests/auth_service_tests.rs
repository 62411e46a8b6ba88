use std::sync::Arc;

use async_trait::async_trait;
use doctor_feedback_backend::config::JwtConfig;
use doctor_feedback_backend::dto::auth_dto::SignupForm;
use doctor_feedback_backend::model::doctor::Doctor;
use doctor_feedback_backend::repository::doctor_repo::DoctorRepository;
use doctor_feedback_backend::repository::memory_repo::MemoryStore;
use doctor_feedback_backend::repository::repository_error::RepositoryResult;
use doctor_feedback_backend::service::auth_service::{AuthService, AuthServiceImpl, DUPLICATE_MOBILE_MESSAGE};
use doctor_feedback_backend::util::error::ServiceError;
use doctor_feedback_backend::util::jwt::JwtTokenUtilsImpl;
use doctor_feedback_backend::util::session_store::MemorySessionStore;
use uuid::Uuid;

/// Doctor store whose mobile lookup never sees a match, as when a concurrent
/// signup inserts the same number between the check and the write.
struct LateDuplicateDoctors(Arc<MemoryStore>);

#[async_trait]
impl DoctorRepository for LateDuplicateDoctors {
    async fn insert(&self, doctor: Doctor) -> RepositoryResult<Doctor> {
        DoctorRepository::insert(self.0.as_ref(), doctor).await
    }

    async fn find_by_user_id(&self, user_id: &Uuid) -> RepositoryResult<Option<Doctor>> {
        self.0.find_by_user_id(user_id).await
    }

    async fn find_by_mobile_number(&self, _mobile_number: &str) -> RepositoryResult<Option<Doctor>> {
        Ok(None)
    }
}

fn service(store: Arc<MemoryStore>) -> AuthServiceImpl {
    AuthServiceImpl::new(
        store.clone(),
        Arc::new(LateDuplicateDoctors(store)),
        Arc::new(MemorySessionStore::new()),
        Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default())),
    )
}

fn form(username: &str, mobile_number: &str) -> SignupForm {
    SignupForm {
        username: username.into(),
        password1: "Stethoscope-42!".into(),
        password2: "Stethoscope-42!".into(),
        full_name: "Amina Benali".into(),
        mobile_number: mobile_number.into(),
        email_address: None,
        specialty: "Dermatology".into(),
        years_of_practice: "12".into(),
        hospital_name: "CHU Mustapha".into(),
        city_location: "Algiers".into(),
    }
}

#[tokio::test]
async fn test_failed_doctor_insert_removes_the_user() {
    let store = Arc::new(MemoryStore::new());
    let auth = service(store.clone());

    auth.signup(form("dr_amina", "0550000001")).await.unwrap();
    assert_eq!(store.counts().await, (1, 1, 0, 0));

    let err = auth.signup(form("dr_karim", "0550000001")).await.unwrap_err();
    match err {
        ServiceError::Validation(fields) => {
            assert_eq!(fields["mobile_number"], vec![DUPLICATE_MOBILE_MESSAGE.to_string()]);
            assert!(!fields.contains_key("username"));
        }
        other => panic!("expected a mobile_number field error, got {:?}", other),
    }
    assert_eq!(store.counts().await, (1, 1, 0, 0));

    // the rolled back username is free again
    auth.signup(form("dr_karim", "0550000002")).await.unwrap();
    assert_eq!(store.counts().await, (2, 2, 0, 0));
}
