use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Every failure a request can end with. Domain kinds carry fixed,
/// deliberately vague messages; `Internal` details are logged, never sent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Account already exists with this email")]
    DuplicateEmail,

    #[error("Account already exists with this phone number")]
    DuplicatePhone,

    #[error("Invalid email/phone or password")]
    InvalidCredentials,

    #[error("Please activate your account first. Check your email for activation link.")]
    AccountNotActivated,

    #[error("Invalid or expired activation token")]
    InvalidActivationToken,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Missing fields: doctor_id, date, and reason are required")]
    MissingFields,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Authorization token is required")]
    MissingToken,

    #[error("Invalid or expired token")]
    Unauthorized,

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Department already exists")]
    DepartmentExists,

    #[error("Department not found")]
    DepartmentNotFound,

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateEmail | AppError::DuplicatePhone => StatusCode::CONFLICT,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::AccountNotActivated => StatusCode::FORBIDDEN,
            AppError::InvalidActivationToken => StatusCode::BAD_REQUEST,
            AppError::AccountNotFound => StatusCode::NOT_FOUND,
            AppError::MissingFields => StatusCode::BAD_REQUEST,
            AppError::DoctorNotFound => StatusCode::NOT_FOUND,
            AppError::AppointmentNotFound => StatusCode::NOT_FOUND,
            AppError::MissingToken | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotAuthorized => StatusCode::FORBIDDEN,
            AppError::DepartmentExists => StatusCode::CONFLICT,
            AppError::DepartmentNotFound => StatusCode::NOT_FOUND,
            AppError::NoFieldsToUpdate => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::Internal(detail) => {
                tracing::error!("Error: {}: {}", status, detail);
                json!({
                    "success": false,
                    "message": "Internal server error"
                })
            }
            AppError::Validation(errors) => {
                tracing::debug!("Validation failed: {:?}", errors);
                json!({
                    "success": false,
                    "message": self.to_string(),
                    "errors": errors
                })
            }
            _ => {
                tracing::debug!("Request rejected: {}: {}", status, self);
                json!({
                    "success": false,
                    "message": self.to_string()
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_internal_error_does_not_leak_details() {
        let (status, body) = body_json(AppError::Internal("connection refused to db:5432".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_validation_error_lists_every_message() {
        let errors = vec!["\"email\" must be a valid email".to_string(), "\"phone\" is required".to_string()];
        let (status, body) = body_json(AppError::Validation(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_credential_errors_share_one_message() {
        let (status, body) = body_json(AppError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid email/phone or password");
    }

    #[test]
    fn test_guard_failures_are_401() {
        assert_eq!(AppError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotAuthorized.status(), StatusCode::FORBIDDEN);
    }
}
