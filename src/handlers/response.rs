//! The uniform JSON envelope every API response is wrapped in.

use crate::{errcode, error::AppError};
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Response envelope.
///
/// ```json
/// {
///   "success": true,
///   "code": "00000",
///   "message": "OK",
///   "data": { "total": 3 },
///   "traceID": "0b6f2f5e-3f7e-4b43-9a37-5cf1d1f9b9a4",
///   "startTime": "2025-01-01T00:00:00.000001Z",
///   "endTime": "2025-01-01T00:00:00.001301Z",
///   "costTime": "1.3ms"
/// }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(rename = "traceID", skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_cost_time"
    )]
    pub cost_time: Option<Duration>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>) -> Self {
        Self {
            success: true,
            code: errcode::SUCCESS.code().to_string(),
            message: "OK".to_string(),
            data,
            trace_id: None,
            start_time: None,
            end_time: None,
            cost_time: None,
        }
    }

    pub fn failure(err: &AppError) -> Self {
        Self {
            success: false,
            code: err.code().code().to_string(),
            message: err.message(),
            data: None,
            trace_id: None,
            start_time: None,
            end_time: None,
            cost_time: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Records when handling started and finished.
    pub fn with_timing(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self.cost_time = Some((end - start).to_std().unwrap_or_default());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Durations render the way `Debug` prints them, e.g. `"14.701µs"`.
fn serialize_cost_time<S: Serializer>(cost: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match cost {
        Some(cost) => s.serialize_str(&format!("{cost:?}")),
        None => s.serialize_none(),
    }
}
