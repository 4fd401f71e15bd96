use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::models::{RecommendationRequest, RecommendationResponse};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/recommendations", web::post().to(get_recommendations));
}

/// Career recommendations endpoint
///
/// POST /api/recommendations
///
/// Request body:
/// ```json
/// {
///   "skills": ["python", "pandas"],
///   "interests": ["Data Science"],
///   "education": "Master's degree",
///   "work_mode": "Remote",
///   "country": "USA",
///   "years_coding": 4,
///   "work_experience": 2.5,
///   "primary_role": "Developer"
/// }
/// ```
async fn get_recommendations(
    state: web::Data<AppState>,
    req: web::Json<RecommendationRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = req.into_inner();

    tracing::info!(
        "Recommendation request: {} skills, {} interests",
        request.skills.len(),
        request.interests.len()
    );

    let result = state.recommender.recommend(request).await?;

    tracing::info!(
        "Recommendation served via {:?} in {:?}",
        result.provenance,
        result.duration
    );

    Ok(HttpResponse::Ok().json(RecommendationResponse::from(result)))
}
