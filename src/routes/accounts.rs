use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{
    LoginRequest, MessageResponse, ProfileResponse, SaveProfileRequest, SignupRequest, UpdatePasswordRequest,
    UserResponse, UsersResponse, STATUS_SUCCESS,
};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/signup", web::post().to(signup))
        .route("/login", web::post().to(login))
        .route("/update-password", web::post().to(update_password))
        .route("/users", web::get().to(list_users))
        .route("/save-profile", web::post().to(save_profile));
}

/// POST /api/signup
async fn signup(
    state: web::Data<AppState>,
    req: web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let user = state.accounts.signup(&req.name, &req.email, &req.password).await?;

    Ok(HttpResponse::Created().json(UserResponse {
        status: STATUS_SUCCESS.to_string(),
        message: "User registered successfully".to_string(),
        user,
    }))
}

/// POST /api/login
///
/// Verifies credentials and returns the account; no session token is issued.
async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let user = state.accounts.login(&req.email, &req.password).await?;

    Ok(HttpResponse::Ok().json(UserResponse {
        status: STATUS_SUCCESS.to_string(),
        message: "Login successful".to_string(),
        user,
    }))
}

/// POST /api/update-password
async fn update_password(
    state: web::Data<AppState>,
    req: web::Json<UpdatePasswordRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    state
        .accounts
        .update_password(&req.email, &req.current_password, &req.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        status: STATUS_SUCCESS.to_string(),
        message: "Password updated successfully".to_string(),
    }))
}

/// GET /api/users
async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let users = state.accounts.list_users().await?;

    Ok(HttpResponse::Ok().json(UsersResponse {
        status: STATUS_SUCCESS.to_string(),
        users,
    }))
}

/// POST /api/save-profile
async fn save_profile(
    state: web::Data<AppState>,
    req: web::Json<SaveProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let req = req.into_inner();
    let email = req.email.clone();
    let profile = state.accounts.save_profile(&email, req.into_update()).await?;

    tracing::debug!("Saved profile for user {}", profile.user_id);

    Ok(HttpResponse::Ok().json(ProfileResponse {
        status: STATUS_SUCCESS.to_string(),
        message: "Profile saved successfully".to_string(),
        profile,
    }))
}
