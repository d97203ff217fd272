//! HTTP error rendering for the console API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ecofind_core::{dialog::DialogError, Error};
use serde::Serialize;
use tracing::error;

/// Body of every error response
#[derive(Debug, Clone, Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Short, stable title
    pub error: String,
    /// Machine-readable code
    pub code: String,
    /// Operator-facing detail
    pub message: String,
}

/// Error returned by console handlers
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Build an error from its parts
    pub fn new(
        status: StatusCode,
        error: &'static str,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            error,
            code,
            message: message.into(),
        }
    }

    /// 400 for malformed input
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad request", "BAD_REQUEST", message)
    }

    /// 401 when no admin session is available
    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "UNAUTHORIZED",
            "Admin session required",
        )
    }

    /// 404 for an unknown resource
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "Not found",
            "NOT_FOUND",
            format!("Resource not found: {}", resource.into()),
        )
    }

    /// HTTP status of the response
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        match err {
            Error::Authentication(_) => Self::new(
                StatusCode::UNAUTHORIZED,
                "Authentication failed",
                "AUTHENTICATION_FAILED",
                message,
            ),
            Error::Validation { .. } | Error::InvalidConfig { .. } => Self::bad_request(message),
            Error::Backend { .. } => Self::new(
                StatusCode::BAD_GATEWAY,
                "Backend error",
                "BACKEND_ERROR",
                message,
            ),
            Error::MalformedResponse(_) => Self::new(
                StatusCode::BAD_GATEWAY,
                "Backend error",
                "MALFORMED_RESPONSE",
                message,
            ),
            Error::Transport(_) => Self::new(
                StatusCode::BAD_GATEWAY,
                "Backend unavailable",
                "BACKEND_UNAVAILABLE",
                message,
            ),
            Error::Timeout { .. } => Self::new(
                StatusCode::GATEWAY_TIMEOUT,
                "Backend timeout",
                "BACKEND_TIMEOUT",
                message,
            ),
            Error::Io(_)
            | Error::Configuration { .. }
            | Error::Serialization(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error",
                "INTERNAL_ERROR",
                message,
            ),
        }
    }
}

impl From<DialogError> for ApiError {
    fn from(err: DialogError) -> Self {
        let message = err.to_string();
        match err {
            DialogError::Busy => {
                Self::new(StatusCode::CONFLICT, "Conflict", "DIALOG_BUSY", message)
            }
            DialogError::Terminal => {
                Self::new(StatusCode::CONFLICT, "Conflict", "DIALOG_ENDED", message)
            }
            DialogError::NotSubmitting => {
                Self::new(StatusCode::CONFLICT, "Conflict", "NOT_SUBMITTING", message)
            }
            DialogError::MissingField { .. } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation error",
                "MISSING_FIELD",
                message,
            ),
            DialogError::NotAnOptionStep { .. }
            | DialogError::NotAnInputStep { .. }
            | DialogError::UnknownOption { .. } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid action",
                "INVALID_ACTION",
                message,
            ),
            DialogError::InvalidScript(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error",
                "INVALID_SCRIPT",
                message,
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(code = self.code, message = %self.message, "Request failed");
        }
        let body = ErrorResponse {
            error: self.error.to_string(),
            code: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Result type for console handlers
pub type ApiResult<T> = Result<T, ApiError>;
