//! HTTP request handlers and the pipeline they run through.
//!
//! API handlers hand their work to [`wrap`], which:
//! 1. Opens a span carrying the request's trace id and the handler name
//! 2. Times the handler and logs the elapsed time
//! 3. Wraps the outcome in the [`ApiResponse`] envelope, choosing the
//!    HTTP status from the error code on failure

use crate::{errcode, error::AppError};
use axum::{
    Json,
    extract::{
        FromRequestParts, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderName, request::Parts},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, future::Future, time::Instant};
use tower_http::request_id::RequestId;
use tracing::Instrument;

pub mod debug;
pub mod endpoints;
pub mod health;
pub mod response;
pub mod systemconfig;

pub use response::ApiResponse;

/// Header carrying the per-request trace id.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Per-request data every API handler receives.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Value of the `x-request-id` header, set by the request-id layer
    pub trace_id: String,
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let trace_id = parts
            .extensions
            .get::<RequestId>()
            .map(RequestId::header_value)
            .or_else(|| parts.headers.get(&REQUEST_ID_HEADER))
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Ok(Self { trace_id })
    }
}

/// Request payloads check their own invariants before the handler runs.
pub trait Validate {
    fn validate(&self) -> Result<(), AppError>;
}

/// Fails with `A0401` when a required string field is blank.
pub fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::cause(
            errcode::BLANK_REQUIRED_PARAMS,
            "failed to validate request",
            format!("field {field:?} is required"),
        ));
    }
    Ok(())
}

/// Unpacks a JSON body and validates it.
pub fn parse_json<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    let Json(payload) = payload
        .map_err(|e| AppError::cause(errcode::DESERIALIZED_PARAMS, "failed to decode json", e.body_text()))?;
    payload.validate()?;
    Ok(payload)
}

/// Unpacks query-string parameters and validates them.
pub fn parse_query<T: Validate>(params: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    let Query(params) = params
        .map_err(|e| AppError::cause(errcode::DESERIALIZED_PARAMS, "failed to decode query", e.body_text()))?;
    params.validate()?;
    Ok(params)
}

/// Runs an API handler body and renders its outcome as an envelope.
pub async fn wrap<T, F>(ctx: RequestContext, handler: &'static str, fut: F) -> Response
where
    T: Serialize,
    F: Future<Output = Result<T, AppError>>,
{
    let span = tracing::info_span!("request", traceID = %ctx.trace_id, handler);

    async move {
        tracing::debug!("Start handling request ...");
        let started = Instant::now();
        let start_time = Utc::now();
        let result = fut.await;
        let end_time = Utc::now();
        tracing::debug!("Handle request took [{:?}]", started.elapsed());

        match result {
            Ok(data) => ApiResponse::success(Some(data))
                .with_trace_id(ctx.trace_id)
                .with_timing(start_time, end_time)
                .into_response(),
            Err(err) => {
                tracing::error!(code = err.code().code(), "Failed to handle request: {err}");
                let body = ApiResponse::<()>::failure(&err)
                    .with_trace_id(ctx.trace_id)
                    .with_timing(start_time, end_time);
                (err.status_code(), body).into_response()
            }
        }
    }
    .instrument(span)
    .await
}

/// Pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Page number, starting from 1
    pub page: i64,
    /// Items per page, between 1 and [`Pagination::MAX_PER_PAGE`]
    pub per_page: i64,
}

impl Pagination {
    pub const MAX_PER_PAGE: i64 = 300;

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// Rows skipped before this page. Saturates instead of overflowing;
    /// validation rejects pages whose offset does not fit.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Validate for Pagination {
    fn validate(&self) -> Result<(), AppError> {
        if self.page < 1 {
            return Err(AppError::cause(
                errcode::EXCEED_RANGE_PARAMS,
                "failed to validate request",
                "page must be at least 1",
            ));
        }
        if !(1..=Self::MAX_PER_PAGE).contains(&self.per_page) {
            return Err(AppError::cause(
                errcode::EXCEED_RANGE_PARAMS,
                "failed to validate request",
                format!("perPage must be between 1 and {}", Self::MAX_PER_PAGE),
            ));
        }
        if (self.page - 1).checked_mul(self.per_page).is_none() {
            return Err(AppError::cause(
                errcode::EXCEED_RANGE_PARAMS,
                "failed to validate request",
                format!("page {} is out of range", self.page),
            ));
        }
        Ok(())
    }
}

/// Free-text search criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Search {
    #[serde(default)]
    pub keyword: String,
}

impl Validate for Search {
    fn validate(&self) -> Result<(), AppError> {
        Ok(())
    }
}
