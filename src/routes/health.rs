use actix_web::{web, HttpResponse, Responder};

use crate::models::{HealthResponse, STATUS_SUCCESS};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/test", web::get().to(api_test));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.accounts.store().health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Liveness probe used by the mobile client
async fn api_test() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "API is working!",
        "timestamp": chrono::Utc::now(),
        "status": STATUS_SUCCESS,
    }))
}
