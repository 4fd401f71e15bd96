use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse};
use std::collections::BTreeMap;
use thiserror::Error;
use validator::ValidationErrors;

use crate::models::{ErrorResponse, STATUS_ERROR};
use crate::services::{AccountError, RecommendError};

/// Errors returned by HTTP handlers
///
/// Messages are safe to show callers; details stay in the server log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        errors: BTreeMap<String, Vec<String>>,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    ExternalModel(String),

    #[error("An internal server error occurred")]
    Internal,
}

impl ApiError {
    pub fn validation(message: impl Into<String>, errors: BTreeMap<String, Vec<String>>) -> Self {
        ApiError::Validation {
            message: message.into(),
            errors,
        }
    }
}

/// Flatten validator output into `field -> [messages]`
pub fn field_errors(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let field = field.to_string();
            let messages = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid ({})", field, e.code),
                })
                .collect();
            (field, messages)
        })
        .collect()
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::validation("The given data was invalid", field_errors(&errors))
    }
}

impl From<RecommendError> for ApiError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::Validation(errors) => errors.into(),
            RecommendError::EnvironmentUnavailable(e) => {
                tracing::error!("Recommendation environment unavailable: {}", e);
                ApiError::ServiceUnavailable("Recommendation service is temporarily unavailable".to_string())
            }
            RecommendError::EmptyOutput | RecommendError::Runner(_) => {
                tracing::error!("Recommendation failed: {}", err);
                ApiError::ExternalModel("Recommendation engine returned no result".to_string())
            }
            RecommendError::ExternalModel(message) => {
                tracing::error!("External model error: {}", message);
                ApiError::ExternalModel("Recommendation engine reported an error".to_string())
            }
            RecommendError::Input(e) => {
                tracing::error!("Failed to prepare recommendation input: {}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::EmailTaken => ApiError::Conflict("Email is already registered".to_string()),
            AccountError::InvalidCredentials => ApiError::Unauthorized("Invalid credentials".to_string()),
            AccountError::UserNotFound => ApiError::NotFound("User not found".to_string()),
            AccountError::Store(e) => {
                tracing::error!("User store error: {}", e);
                ApiError::Internal
            }
            AccountError::Password(e) => {
                tracing::error!("{}", e);
                ApiError::Internal
            }
        }
    }
}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::ExternalModel(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let errors = match self {
            ApiError::Validation { errors, .. } => Some(errors.clone()),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            status: STATUS_ERROR.to_string(),
            message: self.to_string(),
            errors,
        })
    }
}

/// Handle JSON payload errors
///
/// Well-formed JSON with the wrong shape is a validation failure (422);
/// anything else is a bad request.
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);

    match &err {
        error::JsonPayloadError::Deserialize(e) if e.is_data() => {
            let mut errors = BTreeMap::new();
            errors.insert("body".to_string(), vec![e.to_string()]);
            ApiError::validation("The given data was invalid", errors).into()
        }
        _ => ApiError::BadRequest(format!("Invalid JSON: {}", err)).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::EnvironmentError;
    use actix_web::ResponseError;

    #[test]
    fn test_status_mapping() {
        let unavailable: ApiError = RecommendError::EnvironmentUnavailable(EnvironmentError::ScriptNotFound).into();
        assert_eq!(unavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let empty: ApiError = RecommendError::EmptyOutput.into();
        assert_eq!(empty.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let taken: ApiError = AccountError::EmailTaken.into();
        assert_eq!(taken.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_external_error_text_is_not_leaked() {
        let err: ApiError = RecommendError::ExternalModel("/srv/app/df_upsampled.csv missing".to_string()).into();
        assert!(!err.to_string().contains("/srv"));
    }
}
