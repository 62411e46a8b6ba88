use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::serde_fields::{timestamp, uuid_str};

/// Treatment record owned by a single doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(rename = "_id", with = "uuid_str")]
    pub id: Uuid,
    #[serde(with = "uuid_str")]
    pub doctor_id: Uuid,
    pub product_name: String,
    pub disease_name: String,
    /// Comma separated, see [`Patient::conditions_list`]
    pub conditions_treated: String,
    pub biochemistry_data: String,
    pub medical_investigation: String,
    pub improvements_observed: String,
    /// Media storage key under `patients/before/`
    pub before_image: Option<String>,
    /// Media storage key under `patients/after/`
    pub after_image: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Conditions split on commas with surrounding whitespace trimmed.
    ///
    /// Segments are neither filtered nor deduplicated, so `"a,,b"` yields an
    /// empty middle entry.
    pub fn conditions_list(&self) -> Vec<String> {
        split_conditions(&self.conditions_treated)
    }
}

pub fn split_conditions(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|c| c.trim().to_string()).collect()
}

impl std::fmt::Display for Patient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Patient {} - {}", self.id, self.disease_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conditions_are_split_and_trimmed() {
        assert_eq!(
            split_conditions("Diabetes, Hypertension,  Obesity"),
            vec!["Diabetes", "Hypertension", "Obesity"]
        );
    }

    #[test]
    fn test_empty_conditions_yield_empty_list() {
        assert!(split_conditions("").is_empty());
    }

    #[test]
    fn test_blank_segments_are_kept() {
        assert_eq!(split_conditions("Asthma,, Gout ,"), vec!["Asthma", "", "Gout", ""]);
        assert_eq!(split_conditions("   "), vec![""]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        assert_eq!(split_conditions("Gout,Gout"), vec!["Gout", "Gout"]);
    }
}
