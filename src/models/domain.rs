use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Which scoring path produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    ExternalModel,
    FallbackHeuristic,
}

/// Outcome of one recommendation request
#[derive(Debug, Clone)]
pub struct RecommendationResult {
    pub recommendations: Vec<String>,
    pub provenance: Provenance,
    pub duration: Duration,
}

impl RecommendationResult {
    pub fn is_external(&self) -> bool {
        self.provenance == Provenance::ExternalModel
    }
}

/// Document handed to the external scorer through its `--file` argument.
///
/// Key names follow what the scoring script reads, not the HTTP request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScorerPayload {
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub main_branch: String,
    pub work_mode: String,
    pub education: String,
    pub years_code: u32,
    pub country: String,
    pub work_experience: f64,
}

/// Stored account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Fields needed to create an account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Profile attached to a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub dob: Option<chrono::NaiveDate>,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Replacement values for a profile upsert
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub dob: Option<chrono::NaiveDate>,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
}
