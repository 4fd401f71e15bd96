// Unit tests for the recommendation building blocks

use careerpath::core::{
    parse_scorer_output, FallbackScorer, RoleSkillMap, ScorerOutput, FALLBACK_LIMIT,
    GENERIC_RECOMMENDATIONS,
};
use careerpath::models::{Provenance, RecommendationRequest, RecommendationResponse, RecommendationResult};
use careerpath::services::recommender::clean_recommendations;
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

fn skills(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_fallback_web_skills() {
    let scorer = FallbackScorer::default();
    let result = scorer.recommend(&skills(&["HTML/CSS", "javascript", "vue.js"]));

    assert!(result.len() <= FALLBACK_LIMIT);
    assert_eq!(result, vec!["Frontend Developer", "Web Developer", "Full Stack Developer"]);
}

#[test]
fn test_fallback_unknown_skills_are_generic() {
    let scorer = FallbackScorer::default();
    let result = scorer.recommend(&skills(&["basket weaving"]));

    assert_eq!(result, GENERIC_RECOMMENDATIONS.to_vec());
}

#[test]
fn test_fallback_custom_table() {
    let roles = RoleSkillMap::new(vec![
        ("Archivist", vec!["Cataloguing", "preservation"]),
        ("Curator", vec!["exhibitions", "preservation", "research"]),
    ]);
    let scorer = FallbackScorer::new(Arc::new(roles));

    let result = scorer.recommend(&skills(&["PRESERVATION", "research"]));
    assert_eq!(result, vec!["Curator", "Archivist"]);
}

#[test]
fn test_fallback_recommendations_come_from_table() {
    let roles = RoleSkillMap::builtin();
    let scorer = FallbackScorer::default();

    for input in [
        skills(&["python"]),
        skills(&["docker", "aws"]),
        skills(&["sql", "mongodb", "redis"]),
        skills(&["swift", "kotlin"]),
    ] {
        for role in scorer.recommend(&input) {
            assert!(roles.get(&role).is_some(), "{} is not a known role", role);
        }
    }
}

#[test]
fn test_parser_skips_log_lines() {
    let output = "INFO loading\n[progress] 50%\n{\"recommendations\": [\"Cloud Engineer\"]}\ndone\n";

    assert_eq!(
        parse_scorer_output(output),
        ScorerOutput::Recommendations(vec!["Cloud Engineer".to_string()])
    );
}

#[test]
fn test_parser_first_match_wins() {
    let output = "{\"recommendations\": [\"Data Analyst\"]}\n{\"recommendations\": [\"Game Developer\"]}";

    assert_eq!(
        parse_scorer_output(output),
        ScorerOutput::Recommendations(vec!["Data Analyst".to_string()])
    );
}

#[test]
fn test_parser_error_object() {
    let output = "{\"status\": \"error\", \"message\": \"model file missing\"}";

    assert_eq!(
        parse_scorer_output(output),
        ScorerOutput::ExternalError("model file missing".to_string())
    );
}

#[test]
fn test_parser_no_json() {
    assert_eq!(parse_scorer_output("Segmentation fault\n"), ScorerOutput::Unparseable);
    assert_eq!(parse_scorer_output(""), ScorerOutput::Unparseable);
}

#[test]
fn test_clean_recommendations_keeps_order() {
    let cleaned = clean_recommendations(skills(&["Zoologist", "AI", "Backend Developer"]), 5);
    assert_eq!(cleaned, vec!["Zoologist", "Backend Developer"]);
}

#[test]
fn test_request_defaults_flow_into_payload() {
    let mut request = RecommendationRequest {
        skills: skills(&["  rust  ", ""]),
        interests: skills(&["Systems"]),
        country: Some("   ".to_string()),
        ..Default::default()
    };
    request.normalize();
    assert!(request.validate().is_ok());

    let payload = request.to_payload();
    assert_eq!(payload.skills, vec!["rust"]);
    assert_eq!(payload.country, "USA");
    assert_eq!(payload.main_branch, "Developer");
    assert_eq!(payload.years_code, 3);
    assert_eq!(payload.work_experience, 2.0);
}

#[test]
fn test_request_rejects_long_entries() {
    let request = RecommendationRequest {
        skills: vec!["x".repeat(101)],
        interests: skills(&["AI"]),
        ..Default::default()
    };

    assert!(request.validate().is_err());
}

#[test]
fn test_fallback_response_has_no_timing() {
    let response = RecommendationResponse::from(RecommendationResult {
        recommendations: skills(&["Web Developer"]),
        provenance: Provenance::FallbackHeuristic,
        duration: Duration::from_millis(3),
    });

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "success");
    assert!(json.get("execution_time").is_none());
    assert!(json.get("model_confidence").is_none());
}
