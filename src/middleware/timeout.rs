use crate::{errcode, error::AppError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Duration;

/// Answers with a `B0100` envelope when the inner service takes longer
/// than `limit`.
pub async fn timeout(State(limit): State<Duration>, request: Request, next: Next) -> Response {
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(?limit, "Request timed out");
            AppError::cause(errcode::SYSTEM_TIMEOUT, "request timed out", format!("{limit:?} elapsed"))
                .into_response()
        }
    }
}
