use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::domain::{RecommendationResult, User, UserProfile};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Response for the recommendations endpoint.
///
/// Timing and confidence are only reported for the external model path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub status: String,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_confidence: Option<String>,
}

impl From<RecommendationResult> for RecommendationResponse {
    fn from(result: RecommendationResult) -> Self {
        let external = result.is_external();
        Self {
            status: STATUS_SUCCESS.to_string(),
            execution_time: external
                .then(|| (result.duration.as_secs_f64() * 100.0).round() / 100.0),
            model_confidence: external.then(|| "high".to_string()),
            recommendations: result.recommendations,
        }
    }
}

/// Response carrying a single user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub status: String,
    pub message: String,
    pub user: User,
}

/// Response for the user listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub status: String,
    pub users: Vec<User>,
}

/// Response for a saved profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub status: String,
    pub message: String,
    pub profile: UserProfile,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub status: String,
    pub message: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}
