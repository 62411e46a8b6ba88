use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::serde_fields::{timestamp, uuid_str};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(rename = "_id", with = "uuid_str")]
    pub id: Uuid,
    #[serde(with = "uuid_str")]
    pub user_id: Uuid,
    pub full_name: String,
    pub mobile_number: String,
    pub email_address: Option<String>,
    pub specialty: String,
    pub years_of_practice: i32,
    pub hospital_name: String,
    pub city_location: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Display for Doctor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Dr. {} - {}", self.full_name, self.specialty)
    }
}
