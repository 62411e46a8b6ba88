use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::auth_dto::{LoginForm, SignupForm};
use crate::model::doctor::Doctor;
use crate::model::user::User;
use crate::repository::doctor_repo::DoctorRepository;
use crate::repository::user_repo::UserRepository;
use crate::util::error::{field_error, from_validation, merge_field_errors, FieldErrors, ServiceError};
use crate::util::jwt::{Claims, JwtTokenUtils, JwtTokenUtilsImpl, SessionToken};
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};
use crate::util::serde_fields::now;
use crate::util::session_store::SessionStore;

pub const DUPLICATE_USERNAME_MESSAGE: &str = "A user with that username already exists.";
pub const DUPLICATE_MOBILE_MESSAGE: &str = "Doctor with this Mobile number already exists.";

/// Outcome of a successful signup
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    pub doctor: Doctor,
    pub session: SessionToken,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Creates the account and its doctor profile together, then opens a session.
    async fn signup(&self, form: SignupForm) -> Result<Registration, ServiceError>;
    async fn login(&self, form: LoginForm) -> Result<SessionToken, ServiceError>;
    /// Revokes the presented token when it is still valid. Never fails on a bad token.
    async fn logout(&self, token: Option<&str>) -> Result<(), ServiceError>;
    /// Claims of a valid, unrevoked session token
    async fn authenticate(&self, token: &str) -> Result<Claims, ServiceError>;
    async fn resolve_doctor(&self, claims: &Claims) -> Result<Doctor, ServiceError>;
}

pub struct AuthServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub doctor_repo: Arc<dyn DoctorRepository>,
    pub session_store: Arc<dyn SessionStore>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

impl AuthServiceImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        doctor_repo: Arc<dyn DoctorRepository>,
        session_store: Arc<dyn SessionStore>,
        jwt_utils: Arc<JwtTokenUtilsImpl>,
    ) -> Self {
        Self { user_repo, doctor_repo, session_store, jwt_utils }
    }

    /// Field checks that need the stores: password strength and uniqueness.
    /// A username that already failed validation is not compared to the password.
    async fn check_signup(&self, form: &SignupForm, username_valid: bool) -> Result<FieldErrors, ServiceError> {
        let mut errors = FieldErrors::new();

        let username = if username_valid { form.username.as_str() } else { "" };
        if let Err(messages) = PasswordUtilsImpl::validate_password_strength(&form.password2, username) {
            merge_field_errors(&mut errors, FieldErrors::from([("password2".to_string(), messages)]));
        }
        if self.user_repo.find_by_username(&form.username).await?.is_some() {
            merge_field_errors(&mut errors, field_error("username", DUPLICATE_USERNAME_MESSAGE));
        }
        if self.doctor_repo.find_by_mobile_number(&form.mobile_number).await?.is_some() {
            merge_field_errors(&mut errors, field_error("mobile_number", DUPLICATE_MOBILE_MESSAGE));
        }
        Ok(errors)
    }

    fn issue_session(&self, user: &User) -> Result<SessionToken, ServiceError> {
        self.jwt_utils
            .generate_session_token(&user.id.to_string(), &user.username)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))
    }
}

/// Maps unique index violations back to the form field they guard.
fn duplicate_to_field(err: ServiceError) -> ServiceError {
    match err {
        ServiceError::Validation(fields) if fields.contains_key("username") => {
            ServiceError::Validation(field_error("username", DUPLICATE_USERNAME_MESSAGE))
        }
        ServiceError::Validation(fields) if fields.contains_key("mobile_number") => {
            ServiceError::Validation(field_error("mobile_number", DUPLICATE_MOBILE_MESSAGE))
        }
        other => other,
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    #[instrument(skip(self, form), fields(username = %form.username, mobile_number = %form.mobile_number))]
    async fn signup(&self, form: SignupForm) -> Result<Registration, ServiceError> {
        info!("Doctor signup attempt");
        let form = form.normalized();

        let mut errors = match form.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => from_validation(&e),
        };
        // Strength is reported only once both passwords match
        let mut store_errors = self.check_signup(&form, !errors.contains_key("username")).await?;
        if errors.contains_key("password2") {
            store_errors.remove("password2");
        }
        merge_field_errors(&mut errors, store_errors);
        if !errors.is_empty() {
            info!(fields = ?errors.keys().collect::<Vec<_>>(), "Signup rejected");
            return Err(ServiceError::Validation(errors));
        }

        let password_hash = PasswordUtilsImpl::hash_password(&form.password1)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        let at = now();
        let user = User {
            id: Uuid::new_v4(),
            username: form.username.clone(),
            password_hash,
            created_at: at,
            updated_at: at,
        };
        let user = self
            .user_repo
            .insert(user)
            .await
            .map_err(|e| duplicate_to_field(ServiceError::from(e)))?;

        let doctor = Doctor {
            id: Uuid::new_v4(),
            user_id: user.id,
            full_name: form.full_name.clone(),
            mobile_number: form.mobile_number.clone(),
            email_address: form.email_address.clone(),
            specialty: form.specialty.clone(),
            years_of_practice: form.years(),
            hospital_name: form.hospital_name.clone(),
            city_location: form.city_location.clone(),
            created_at: at,
            updated_at: at,
        };
        let doctor = match self.doctor_repo.insert(doctor).await {
            Ok(doctor) => doctor,
            Err(e) => {
                error!("Doctor insert failed, removing user {}: {}", user.id, e);
                if let Err(cleanup) = self.user_repo.delete(&user.id).await {
                    error!("Failed to remove user {} after doctor insert failure: {}", user.id, cleanup);
                }
                return Err(duplicate_to_field(ServiceError::from(e)));
            }
        };

        let session = self.issue_session(&user)?;
        info!(user_id = %user.id, doctor_id = %doctor.id, "Doctor registered");
        Ok(Registration { user, doctor, session })
    }

    #[instrument(skip(self, form), fields(username = %form.username))]
    async fn login(&self, form: LoginForm) -> Result<SessionToken, ServiceError> {
        form.validate().map_err(|e| ServiceError::Validation(from_validation(&e)))?;

        let user = match self.user_repo.find_by_username(&form.username).await? {
            Some(user) => user,
            None => {
                warn!("Login attempt for unknown username");
                return Err(ServiceError::InvalidCredentials);
            }
        };
        let valid = PasswordUtilsImpl::verify_password(&form.password, &user.password_hash)
            .map_err(|e| ServiceError::InternalError(format!("Password verify error: {}", e)))?;
        if !valid {
            warn!("Invalid password for user {}", user.id);
            return Err(ServiceError::InvalidCredentials);
        }

        let session = self.issue_session(&user)?;
        info!(user_id = %user.id, "User logged in successfully");
        Ok(session)
    }

    #[instrument(skip(self, token))]
    async fn logout(&self, token: Option<&str>) -> Result<(), ServiceError> {
        let Some(token) = token else {
            return Ok(());
        };
        let claims = match self.jwt_utils.validate_session_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                info!("Logout with unusable token: {}", e);
                return Ok(());
            }
        };
        self.session_store
            .revoke(&claims.jti, claims.remaining_secs())
            .await
            .map_err(ServiceError::internal)?;
        info!(user_id = %claims.sub, "Session revoked");
        Ok(())
    }

    async fn authenticate(&self, token: &str) -> Result<Claims, ServiceError> {
        let claims = self
            .jwt_utils
            .validate_session_token(token)
            .map_err(|e| ServiceError::Unauthorized(e.to_string()))?;
        let revoked = self.session_store.is_revoked(&claims.jti).await.map_err(ServiceError::internal)?;
        if revoked {
            warn!(user_id = %claims.sub, "Revoked session token presented");
            return Err(ServiceError::Unauthorized("Session has been revoked".to_string()));
        }
        Ok(claims)
    }

    #[instrument(skip(self, claims), fields(user_id = %claims.sub))]
    async fn resolve_doctor(&self, claims: &Claims) -> Result<Doctor, ServiceError> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ServiceError::Unauthorized("Malformed session subject".to_string()))?;
        let doctor = self.doctor_repo.find_by_user_id(&user_id).await;
        match doctor {
            Ok(Some(doctor)) => Ok(doctor),
            Ok(None) => {
                warn!("Authenticated user has no doctor profile");
                Err(ServiceError::MissingProfile)
            }
            Err(e) => {
                error!("Failed to load doctor profile: {}", e);
                Err(e.into())
            }
        }
    }
}
