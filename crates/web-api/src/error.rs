use application::ApplicationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, RepositoryError};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.body.code
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        use application::ApplicationError as AppErr;

        // 内部故障只记录日志，不把细节返回给客户端
        if error.is_internal() {
            error!(error = %error, "request failed with internal error");
            return ApiError::internal_server_error("internal server error");
        }

        match error {
            AppErr::Domain(DomainError::InvalidArgument { field, reason }) => ApiError::new(
                StatusCode::BAD_REQUEST,
                "INVALID_ARGUMENT",
                format!("{}: {}", field, reason),
            ),
            AppErr::Domain(DomainError::UserNotFound) => {
                ApiError::new(StatusCode::NOT_FOUND, "USER_NOT_FOUND", "user not found")
            }
            AppErr::Domain(DomainError::GameNotFound) => {
                ApiError::new(StatusCode::NOT_FOUND, "GAME_NOT_FOUND", "game not found")
            }
            AppErr::Domain(DomainError::ImageNotFound) => {
                ApiError::new(StatusCode::NOT_FOUND, "IMAGE_NOT_FOUND", "image not found")
            }
            AppErr::Domain(DomainError::EmailAlreadyInUse) => ApiError::new(
                StatusCode::FORBIDDEN,
                "EMAIL_IN_USE",
                "email already in use",
            ),
            AppErr::Domain(DomainError::TitleAlreadyInUse) => ApiError::new(
                StatusCode::FORBIDDEN,
                "TITLE_IN_USE",
                "game title already in use",
            ),
            AppErr::Domain(DomainError::OperationNotAllowed { reason }) => {
                ApiError::new(StatusCode::FORBIDDEN, "OPERATION_NOT_ALLOWED", reason)
            }
            AppErr::Repository(RepositoryError::NotFound) => ApiError::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "requested resource not found",
            ),
            AppErr::Repository(RepositoryError::Conflict) => {
                ApiError::new(StatusCode::FORBIDDEN, "CONFLICT", "resource already exists")
            }
            AppErr::Authentication => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "AUTHENTICATION_REQUIRED",
                "authentication required",
            ),
            AppErr::InvalidCredentials => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "invalid email or password",
            ),
            other => {
                error!(error = %other, "unmapped application error");
                ApiError::internal_server_error("internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use application::{ImageStoreError, PasswordHasherError};

    use super::*;

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        let cases = [
            (
                ApplicationError::invalid_argument("title", "cannot be empty"),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApplicationError::Domain(DomainError::GameNotFound),
                StatusCode::NOT_FOUND,
            ),
            (
                ApplicationError::Domain(DomainError::EmailAlreadyInUse),
                StatusCode::FORBIDDEN,
            ),
            (
                ApplicationError::not_allowed("cannot review your own game"),
                StatusCode::FORBIDDEN,
            ),
            (ApplicationError::Authentication, StatusCode::UNAUTHORIZED),
            (ApplicationError::InvalidCredentials, StatusCode::UNAUTHORIZED),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status(), status);
        }
    }

    #[test]
    fn internal_failures_hide_details() {
        let err = ApiError::from(ApplicationError::Repository(RepositoryError::storage(
            "connection refused",
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.body.message.contains("connection refused"));

        let err = ApiError::from(ApplicationError::Password(PasswordHasherError::hash_error(
            "boom",
        )));
        assert_eq!(err.code(), "INTERNAL_ERROR");

        let err = ApiError::from(ApplicationError::ImageStore(ImageStoreError::Io(
            "disk full".into(),
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
