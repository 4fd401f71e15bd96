use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::domain::{ProfileUpdate, ScorerPayload};

pub const MAX_LIST_ENTRIES: u64 = 20;
pub const MAX_ENTRY_CHARS: usize = 100;

pub const DEFAULT_PRIMARY_ROLE: &str = "Developer";
pub const DEFAULT_WORK_MODE: &str = "Hybrid";
pub const DEFAULT_EDUCATION: &str = "Bachelor's degree (B.A., B.S., B.Eng., etc.)";
pub const DEFAULT_YEARS_CODING: i64 = 3;
pub const DEFAULT_COUNTRY: &str = "USA";
pub const DEFAULT_WORK_EXPERIENCE: f64 = 2.0;

/// Request for career recommendations
///
/// POST /api/recommendations
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RecommendationRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 20, message = "skills must contain between 1 and 20 entries"),
        custom(function = "validate_entry_lengths")
    )]
    pub skills: Vec<String>,
    #[serde(default)]
    #[validate(
        length(min = 1, max = 20, message = "interests must contain between 1 and 20 entries"),
        custom(function = "validate_entry_lengths")
    )]
    pub interests: Vec<String>,
    #[validate(length(max = 200))]
    pub education: Option<String>,
    #[validate(length(max = 50))]
    pub work_mode: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
    /// Also accepted as `years_code`, the name mobile clients send
    #[serde(alias = "years_code")]
    #[validate(range(min = 0, max = 50, message = "years_coding must be between 0 and 50"))]
    pub years_coding: Option<i64>,
    #[validate(range(min = 0.0, max = 50.0, message = "work_experience must be between 0 and 50"))]
    pub work_experience: Option<f64>,
    #[serde(alias = "main_branch")]
    #[validate(length(max = 50))]
    pub primary_role: Option<String>,
}

impl RecommendationRequest {
    /// Trim list entries and drop blank ones; blank optional strings count as omitted.
    pub fn normalize(&mut self) {
        normalize_list(&mut self.skills);
        normalize_list(&mut self.interests);
        for field in [
            &mut self.education,
            &mut self.work_mode,
            &mut self.country,
            &mut self.primary_role,
        ] {
            if let Some(value) = field.take() {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    *field = Some(trimmed.to_string());
                }
            }
        }
    }

    /// Build the scorer document, filling defaults for omitted fields
    pub fn to_payload(&self) -> ScorerPayload {
        ScorerPayload {
            skills: self.skills.clone(),
            interests: self.interests.clone(),
            main_branch: self
                .primary_role
                .clone()
                .unwrap_or_else(|| DEFAULT_PRIMARY_ROLE.to_string()),
            work_mode: self
                .work_mode
                .clone()
                .unwrap_or_else(|| DEFAULT_WORK_MODE.to_string()),
            education: self
                .education
                .clone()
                .unwrap_or_else(|| DEFAULT_EDUCATION.to_string()),
            years_code: self.years_coding.unwrap_or(DEFAULT_YEARS_CODING).clamp(0, 50) as u32,
            country: self
                .country
                .clone()
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            work_experience: self.work_experience.unwrap_or(DEFAULT_WORK_EXPERIENCE),
        }
    }
}

fn normalize_list(entries: &mut Vec<String>) {
    *entries = entries
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect();
}

#[allow(clippy::ptr_arg)]
fn validate_entry_lengths(entries: &Vec<String>) -> Result<(), ValidationError> {
    if entries.iter().any(|entry| entry.chars().count() > MAX_ENTRY_CHARS) {
        let mut err = ValidationError::new("entry_length");
        err.message = Some(format!("entries may not exceed {} characters", MAX_ENTRY_CHARS).into());
        return Err(err);
    }
    Ok(())
}

/// POST /api/signup
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "password must be between 8 and 128 characters"))]
    pub password: String,
}

/// POST /api/login
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// POST /api/update-password
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8, max = 128, message = "password must be between 8 and 128 characters"))]
    pub new_password: String,
}

/// POST /api/save-profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveProfileRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 32))]
    pub contact_number: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    pub dob: Option<chrono::NaiveDate>,
    #[serde(default)]
    #[validate(length(max = 20), custom(function = "validate_entry_lengths"))]
    pub skills: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 20), custom(function = "validate_entry_lengths"))]
    pub interests: Vec<String>,
}

impl SaveProfileRequest {
    pub fn into_update(mut self) -> ProfileUpdate {
        normalize_list(&mut self.skills);
        normalize_list(&mut self.interests);
        ProfileUpdate {
            name: self.name,
            contact_number: self.contact_number,
            address: self.address,
            dob: self.dob,
            skills: self.skills,
            interests: self.interests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(skills: &[&str], interests: &[&str]) -> RecommendationRequest {
        RecommendationRequest {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            interests: interests.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_drops_blank_entries() {
        let mut req = request(&["  python ", "", "   "], &["ml"]);
        req.education = Some("   ".to_string());
        req.normalize();

        assert_eq!(req.skills, vec!["python"]);
        assert!(req.education.is_none());
    }

    #[test]
    fn test_accepts_scorer_field_names() {
        let req: RecommendationRequest = serde_json::from_str(
            r#"{"skills": ["go"], "interests": ["cloud"], "years_code": 9, "main_branch": "Student"}"#,
        )
        .unwrap();

        assert_eq!(req.years_coding, Some(9));
        assert_eq!(req.primary_role.as_deref(), Some("Student"));

        let payload = req.to_payload();
        assert_eq!(payload.years_code, 9);
        assert_eq!(payload.main_branch, "Student");
    }

    #[test]
    fn test_optional_field_length_caps() {
        let mut req = request(&["go"], &["cloud"]);
        req.education = Some("e".repeat(200));
        req.work_mode = Some("w".repeat(50));
        req.country = Some("c".repeat(100));
        req.primary_role = Some("p".repeat(50));
        assert!(req.validate().is_ok());

        req.work_mode = Some("w".repeat(51));
        req.primary_role = Some("p".repeat(51));
        req.education = Some("e".repeat(201));
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("work_mode"));
        assert!(fields.contains_key("primary_role"));
        assert!(fields.contains_key("education"));
        assert!(!fields.contains_key("country"));
    }

    #[test]
    fn test_blank_skills_fail_validation() {
        let mut req = request(&["  "], &["ml"]);
        req.normalize();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("skills"));
    }

    #[test]
    fn test_too_many_entries_rejected() {
        let skills: Vec<String> = (0..21).map(|i| format!("skill{}", i)).collect();
        let req = RecommendationRequest {
            skills,
            interests: vec!["web".to_string()],
            ..Default::default()
        };

        assert!(req.validate().is_err());
    }

    #[test]
    fn test_long_entry_rejected() {
        let req = request(&[&"x".repeat(101)], &["web"]);
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("skills"));
    }

    #[test]
    fn test_out_of_range_years_rejected() {
        let mut req = request(&["python"], &["web"]);
        req.years_coding = Some(51);
        assert!(req.validate().is_err());

        req.years_coding = Some(50);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_payload_applies_defaults() {
        let payload = request(&["python"], &["AI"]).to_payload();

        assert_eq!(payload.main_branch, "Developer");
        assert_eq!(payload.work_mode, "Hybrid");
        assert_eq!(payload.education, DEFAULT_EDUCATION);
        assert_eq!(payload.years_code, 3);
        assert_eq!(payload.country, "USA");
        assert_eq!(payload.work_experience, 2.0);
    }

    #[test]
    fn test_payload_uses_script_key_names() {
        let mut req = request(&["python"], &["AI"]);
        req.primary_role = Some("Student".to_string());
        req.years_coding = Some(7);

        let json = serde_json::to_value(req.to_payload()).unwrap();
        assert_eq!(json["main_branch"], "Student");
        assert_eq!(json["years_code"], 7);
        assert!(json.get("primary_role").is_none());
    }
}
