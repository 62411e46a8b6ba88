use axum::{routing::get, Router};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{
    AppConfig, ConfigError, JwtConfig, MediaBackend, MediaConfig, MinioConfig, MongoConfig, RedisConfig,
    StorageBackend,
};
use crate::repository::doctor_repo::{DoctorRepository, MongoDoctorRepository};
use crate::repository::memory_repo::MemoryStore;
use crate::repository::mongo;
use crate::repository::patient_repo::{MongoPatientRepository, PatientRepository};
use crate::repository::patient_update_repo::{MongoPatientUpdateRepository, PatientUpdateRepository};
use crate::repository::repository_error::RepositoryError;
use crate::repository::user_repo::{MongoUserRepository, UserRepository};
use crate::router::auth_router::auth_router;
use crate::router::patient_router::patient_router;
use crate::service::auth_service::{AuthService, AuthServiceImpl};
use crate::service::patient_service::{PatientService, PatientServiceImpl};
use crate::util::jwt::JwtTokenUtilsImpl;
use crate::util::media::{LocalMediaStore, MediaStore};
use crate::util::minio::{MinioError, MinioService};
use crate::util::redis::RedisService;
use crate::util::session_store::{MemorySessionStore, RedisSessionStore, SessionStore};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Media storage error: {0}")]
    Media(#[from] MinioError),
    #[error("Invalid listen address: {0}")]
    Address(String),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared state handed to every handler and to the session middleware
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub patient_service: Arc<dyn PatientService>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub config: Arc<AppConfig>,
}

/// The four stores behind the services
struct Repositories {
    users: Arc<dyn UserRepository>,
    doctors: Arc<dyn DoctorRepository>,
    patients: Arc<dyn PatientRepository>,
    updates: Arc<dyn PatientUpdateRepository>,
}

impl Repositories {
    fn memory(store: Arc<MemoryStore>) -> Self {
        Repositories {
            users: store.clone(),
            doctors: store.clone(),
            patients: store.clone(),
            updates: store,
        }
    }

    fn mongo(db: &mongodb::Database) -> Self {
        Repositories {
            users: Arc::new(MongoUserRepository::new(db)),
            doctors: Arc::new(MongoDoctorRepository::new(db)),
            patients: Arc::new(MongoPatientRepository::new(db)),
            updates: Arc::new(MongoPatientUpdateRepository::new(db)),
        }
    }
}

impl AppState {
    fn assemble(
        config: AppConfig,
        jwt_config: JwtConfig,
        repos: Repositories,
        session_store: Arc<dyn SessionStore>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        let auth_service = Arc::new(AuthServiceImpl::new(
            repos.users,
            repos.doctors,
            session_store,
            jwt_utils.clone(),
        ));
        let patient_service = Arc::new(PatientServiceImpl::new(repos.patients, repos.updates, media));
        AppState { auth_service, patient_service, jwt_utils, config: Arc::new(config) }
    }

    /// Fully in-process state over `store`, with images written under `media_root`
    pub fn in_memory(store: Arc<MemoryStore>, jwt_config: JwtConfig, media_root: impl Into<PathBuf>) -> Self {
        let media = MediaConfig::local(media_root);
        AppState::assemble(
            AppConfig::default(),
            jwt_config,
            Repositories::memory(store),
            Arc::new(MemorySessionStore::new()),
            Arc::new(LocalMediaStore::new(media.root, media.url_prefix)),
        )
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(auth_router(state.clone()))
        .merge(patient_router(state))
        .route("/health", get(|| async { "OK" }))
}

pub struct App {
    config: Arc<AppConfig>,
    router: Router,
}

impl App {
    pub async fn new() -> Result<Self, AppError> {
        let config = AppConfig::from_env()?;
        let jwt_config = JwtConfig::from_env()?;
        let media_config = MediaConfig::from_env()?;

        let (repos, session_store) = match config.storage {
            StorageBackend::Memory => {
                warn!("Using in-memory storage; data is lost on restart");
                let store = Arc::new(MemoryStore::new());
                (Repositories::memory(store), Arc::new(MemorySessionStore::new()) as Arc<dyn SessionStore>)
            }
            StorageBackend::Mongo => {
                let mongo_config = MongoConfig::from_env()?;
                let db = mongo::connect(&mongo_config).await?;
                mongo::ensure_indexes(&db).await?;
                (Repositories::mongo(&db), App::session_store().await)
            }
        };

        let media: Arc<dyn MediaStore> = match media_config.backend {
            MediaBackend::Local => {
                info!(root = %media_config.root.display(), "Storing media on the local filesystem");
                Arc::new(LocalMediaStore::new(media_config.root, media_config.url_prefix))
            }
            MediaBackend::Minio => Arc::new(MinioService::new(MinioConfig::from_env()?).await?),
        };

        let state = AppState::assemble(config, jwt_config, repos, session_store, media);
        let config = state.config.clone();
        Ok(App { config, router: build_router(state) })
    }

    /// Redis-backed revocation when Redis is configured and reachable
    async fn session_store() -> Arc<dyn SessionStore> {
        let redis_config = match RedisConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                warn!("Redis not configured ({}), revoked sessions are kept in memory", e);
                return Arc::new(MemorySessionStore::new());
            }
        };
        match RedisService::new(redis_config).await {
            Ok(redis) => Arc::new(RedisSessionStore::new(redis)),
            Err(e) => {
                warn!("Redis unavailable ({}), revoked sessions are kept in memory", e);
                Arc::new(MemorySessionStore::new())
            }
        }
    }

    pub async fn start(self) -> Result<(), AppError> {
        let host: IpAddr = self
            .config
            .host
            .parse()
            .map_err(|_| AppError::Address(self.config.host.clone()))?;
        let addr = SocketAddr::new(host, self.config.port);
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
