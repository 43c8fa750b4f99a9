use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value;
use strokedesk_schema::ValidationErrors;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum StrokedeskError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Patient ID {patient_id} already exists")]
    DuplicateKey { patient_id: u32 },

    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Login required")]
    LoginRequired,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is deactivated")]
    AccountInactive,

    #[error("CSRF token missing or invalid")]
    CsrfMismatch,

    #[error("Too many login attempts")]
    RateLimited,

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<ValidationErrors> for StrokedeskError {
    fn from(errors: ValidationErrors) -> Self {
        StrokedeskError::Validation(errors)
    }
}

impl IntoResponse for StrokedeskError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            StrokedeskError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiErrorObject {
                    code: "VALIDATION_FAILED".to_string(),
                    message: "One or more fields are invalid.".to_string(),
                    details: serde_json::to_value(&errors).ok(),
                },
            ),

            StrokedeskError::DuplicateKey { patient_id } => (
                StatusCode::CONFLICT,
                ApiErrorObject {
                    code: "DUPLICATE_PATIENT_ID".to_string(),
                    message: format!("Patient ID {patient_id} already exists."),
                    details: Some(serde_json::json!([{
                        "field": "patient_id",
                        "code": "duplicate",
                        "message": format!("Patient ID {patient_id} already exists."),
                    }])),
                },
            ),

            StrokedeskError::StoreUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiErrorObject {
                    code: "STORE_UNAVAILABLE".to_string(),
                    message: "Patient records are temporarily unavailable.".to_string(),
                    details: None,
                },
            ),

            StrokedeskError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ApiErrorObject {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{what} not found."),
                    details: None,
                },
            ),

            StrokedeskError::LoginRequired => (
                StatusCode::UNAUTHORIZED,
                ApiErrorObject {
                    code: "LOGIN_REQUIRED".to_string(),
                    message: "Please log in to access this page.".to_string(),
                    details: None,
                },
            ),

            StrokedeskError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ApiErrorObject {
                    code: "INVALID_CREDENTIALS".to_string(),
                    message: "Invalid username or password. Please try again.".to_string(),
                    details: None,
                },
            ),

            StrokedeskError::AccountInactive => (
                StatusCode::FORBIDDEN,
                ApiErrorObject {
                    code: "ACCOUNT_INACTIVE".to_string(),
                    message: "Your account has been deactivated. Please contact support."
                        .to_string(),
                    details: None,
                },
            ),

            StrokedeskError::CsrfMismatch => (
                StatusCode::FORBIDDEN,
                ApiErrorObject {
                    code: "CSRF_MISMATCH".to_string(),
                    message: "The CSRF token is missing or invalid.".to_string(),
                    details: None,
                },
            ),

            StrokedeskError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                ApiErrorObject {
                    code: "RATE_LIMIT".to_string(),
                    message: "Too many login attempts. Please wait a minute.".to_string(),
                    details: None,
                },
            ),

            StrokedeskError::DatabaseError(_)
            | StrokedeskError::RactorError(_)
            | StrokedeskError::JsonError(_)
            | StrokedeskError::UnexpectedError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorObject {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                    details: None,
                },
            ),
        };
        (status, Json(ApiErrorBody { inner: error_body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
