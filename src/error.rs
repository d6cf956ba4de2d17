use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Failure while serving a single request. The display text is echoed
/// verbatim to the client in the `error` field.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    MalformedBody(String),

    #[error("{0}")]
    InvalidId(String),

    #[error("{0}")]
    Encoding(String),

    #[error("{reason}")]
    Body { status: StatusCode, reason: String },

    #[error("{0}")]
    Database(anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Only body-read failures carry their own status; malformed input and
    /// database failures all answer 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Body { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedBody(err.to_string())
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        AppError::Body {
            status: rejection.status(),
            reason: rejection.body_text(),
        }
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Database(anyhow::Error::new(err))
    }
}

/// An [`AppError`] tagged with the human-readable message of the operation
/// that failed. Renders the `{ "message", "error" }` envelope.
#[derive(Debug)]
pub struct OperationError {
    pub message: &'static str,
    pub source: AppError,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    error: String,
}

impl IntoResponse for OperationError {
    fn into_response(self) -> Response {
        let status = self.source.status_code();

        match &self.source {
            AppError::Database(err) => error!(error = %err, "{}", self.message),
            other => warn!(error = %other, "{}", self.message),
        }

        let body = ErrorBody {
            message: self.message,
            error: self.source.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub trait OperationContext<T> {
    fn or_fail_with(self, message: &'static str) -> Result<T, OperationError>;
}

impl<T, E: Into<AppError>> OperationContext<T> for Result<T, E> {
    fn or_fail_with(self, message: &'static str) -> Result<T, OperationError> {
        self.map_err(|err| OperationError {
            message,
            source: err.into(),
        })
    }
}
