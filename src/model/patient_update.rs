use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::serde_fields::{timestamp, uuid_str};

/// Progress entry attached to a patient. Never modified after creation;
/// `updated_at` is the creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientUpdate {
    #[serde(rename = "_id", with = "uuid_str")]
    pub id: Uuid,
    #[serde(with = "uuid_str")]
    pub patient_id: Uuid,
    pub update_data: serde_json::Value,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}
