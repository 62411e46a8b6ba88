use bson::doc;
use mongodb::options::{ClientOptions, Credential, IndexOptions, ResolverConfig};
use mongodb::{Client, Database, IndexModel};
use tracing::{info, instrument};

use crate::config::mongo_conf::MongoConfig;
use crate::repository::repository_error::RepositoryResult;

pub const USERS: &str = "users";
pub const DOCTORS: &str = "doctors";
pub const PATIENTS: &str = "patients";
pub const PATIENT_UPDATES: &str = "patient_updates";

/// Open one pooled client and return the configured database.
#[instrument(skip(config), fields(database = %config.database))]
pub async fn connect(config: &MongoConfig) -> Result<Database, mongodb::error::Error> {
    let mut client_options =
        ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
    client_options.app_name = Some("DoctorFeedbackBackend".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(std::time::Duration::from_secs(config.connection_timeout_secs));

    if let (Some(ref username), Some(ref password)) = (&config.username, &config.password) {
        client_options.credential = Some(
            Credential::builder()
                .username(username.clone())
                .password(password.clone())
                .build(),
        );
    }

    let client = Client::with_options(client_options)?;
    info!("MongoDB client created");
    Ok(client.database(&config.database))
}

/// Unique indexes backing the username and mobile number invariants, plus
/// the lookup indexes used by the ownership-scoped listings.
#[instrument(skip(db))]
pub async fn ensure_indexes(db: &Database) -> RepositoryResult<()> {
    let unique = || IndexOptions::builder().unique(true).build();

    db.collection::<bson::Document>(USERS)
        .create_index(IndexModel::builder().keys(doc! { "username": 1 }).options(unique()).build(), None)
        .await?;

    let doctors = db.collection::<bson::Document>(DOCTORS);
    doctors
        .create_index(IndexModel::builder().keys(doc! { "mobile_number": 1 }).options(unique()).build(), None)
        .await?;
    doctors
        .create_index(IndexModel::builder().keys(doc! { "user_id": 1 }).options(unique()).build(), None)
        .await?;

    db.collection::<bson::Document>(PATIENTS)
        .create_index(IndexModel::builder().keys(doc! { "doctor_id": 1, "created_at": -1 }).build(), None)
        .await?;
    db.collection::<bson::Document>(PATIENT_UPDATES)
        .create_index(IndexModel::builder().keys(doc! { "patient_id": 1, "updated_at": -1 }).build(), None)
        .await?;

    info!("MongoDB indexes ensured");
    Ok(())
}
