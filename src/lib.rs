//! CareerPath - career recommendation and account backend
//!
//! Recommendations come from an external scoring script when the tool chain
//! is provisioned, with a keyword-overlap heuristic as the fallback.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{FallbackScorer, RoleSkillMap, parse_scorer_output, ScorerOutput};
pub use error::ApiError;
pub use models::{RecommendationRequest, RecommendationResponse, RecommendationResult, Provenance};
pub use services::{Recommender, RecommendError};
