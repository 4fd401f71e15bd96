// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{NewUser, ProfileUpdate, Provenance, RecommendationResult, ScorerPayload, User, UserProfile};
pub use requests::{LoginRequest, RecommendationRequest, SaveProfileRequest, SignupRequest, UpdatePasswordRequest};
pub use responses::{
    ErrorResponse, HealthResponse, MessageResponse, ProfileResponse, RecommendationResponse, UserResponse,
    UsersResponse, STATUS_ERROR, STATUS_SUCCESS,
};
