//! Error types and HTTP error response handling.
//!
//! This module defines the HTTP-facing application error and how it is
//! converted into the standard response envelope with a business code and
//! a status derived from that code.

use crate::{
    domain::repository::RepositoryError,
    errcode::{self, ErrorCode},
    handlers::response::ApiResponse,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt::Display;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Code**: a bare business code; the client sees the code's own message
/// - **Detail**: a business code plus context and the underlying cause
/// - **Repository**: storage failures, mapped onto codes by kind
/// - **Internal**: anything else, reported as `B0001`
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Code(ErrorCode),

    #[error("{context}: {cause}")]
    Detail {
        code: ErrorCode,
        context: String,
        cause: String,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Wraps `cause` under `code`, prefixed by a short context message.
    pub fn cause(code: ErrorCode, context: impl Into<String>, cause: impl Display) -> Self {
        AppError::Detail {
            code,
            context: context.into(),
            cause: cause.to_string(),
        }
    }

    /// The business code reported to the client.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Code(code) | AppError::Detail { code, .. } => *code,
            AppError::Repository(RepositoryError::NotFound) => errcode::NOT_FOUND,
            AppError::Repository(RepositoryError::MissingId) => errcode::BLANK_REQUIRED_PARAMS,
            AppError::Repository(RepositoryError::Database(_)) => errcode::DATABASE_SERVICE_ERROR,
            AppError::Repository(RepositoryError::InvalidRecord { .. }) | AppError::Internal(_) => {
                errcode::INTERNAL_ERROR
            }
        }
    }

    /// The human-readable message reported to the client.
    ///
    /// Database errors are summarised so connection details do not leak.
    pub fn message(&self) -> String {
        match self {
            AppError::Code(code) => code.message().to_string(),
            AppError::Repository(RepositoryError::Database(_)) => {
                errcode::DATABASE_SERVICE_ERROR.message().to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.code().status_code()
    }
}

impl From<ErrorCode> for AppError {
    fn from(code: ErrorCode) -> Self {
        AppError::Code(code)
    }
}

/// Convert AppError into an HTTP response.
///
/// Errors raised outside the handler pipeline (timeouts, panics, extractor
/// failures) still answer with the standard envelope, minus timing fields.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, ApiResponse::<()>::failure(&self)).into_response()
    }
}
