//! The JSON error envelope returned by every endpoint.
//!
//! Body shape: `{ "error": "<message>", "code": "<ERROR_CODE>" }`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use holdco_core::access::AccessError;
use holdco_core::allocation::AllocationError;
use holdco_core::transaction::TransactionValidationError;
use holdco_core::workflow::WorkflowError;
use holdco_db::RepositoryError;
use holdco_shared::{AppError, JwtError};
use serde::Serialize;
use validator::ValidationErrors;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    detail: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: &'a str,
}

impl ApiError {
    /// 401 with the given message.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::from(AppError::Unauthorized(message.into()))
    }

    /// 400 with the given message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::from(AppError::Validation(message.into()))
    }

    /// Status code of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Message shown to the client.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    fn with_code(mut self, code: &'static str) -> Self {
        self.code = code;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = self.status.as_u16(),
                code = self.code,
                detail = self.detail.as_deref().unwrap_or_default(),
                "request failed"
            );
        }
        let body = ErrorBody {
            error: &self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            code: err.error_code(),
            message: err.public_message(),
            detail: err.is_server_error().then(|| err.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        let code = match &err {
            RepositoryError::Workflow(e) => Some(e.error_code()),
            RepositoryError::Access(e) => Some(e.error_code()),
            RepositoryError::Allocation(e) => Some(e.error_code()),
            RepositoryError::Transaction(e) => Some(e.error_code()),
            RepositoryError::InUse(_) => Some("IN_USE"),
            RepositoryError::Duplicate(_) => Some("DUPLICATE"),
            _ => None,
        };
        let api = Self::from(AppError::from(err));
        match code {
            Some(code) => api.with_code(code),
            None => api,
        }
    }
}

impl From<TransactionValidationError> for ApiError {
    fn from(err: TransactionValidationError) -> Self {
        RepositoryError::from(err).into()
    }
}

impl From<AllocationError> for ApiError {
    fn from(err: AllocationError) -> Self {
        RepositoryError::from(err).into()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        RepositoryError::from(err).into()
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        RepositoryError::from(err).into()
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        RepositoryError::from(err).into()
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::unauthorized("Token has expired").with_code("TOKEN_EXPIRED"),
            JwtError::DecodingError(_) => {
                Self::unauthorized("Invalid or malformed token").with_code("INVALID_TOKEN")
            }
            JwtError::EncodingError(e) => AppError::Internal(e).into(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation(describe(&errors))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

/// Flattens validator errors into `field: message; field: message`.
fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map_or_else(|| e.code.to_string(), ToString::to_string);
                format!("{field}: {message}")
            })
        })
        .collect();
    parts.sort();
    if parts.is_empty() {
        "Invalid request".to_string()
    } else {
        parts.join("; ")
    }
}
