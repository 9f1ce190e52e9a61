//! System config HTTP handlers.
//!
//! This module implements the `/api/v1` endpoints:
//! - POST /systemconfig - Create a system config
//! - DELETE /systemconfig/{id} - Delete a system config
//! - PUT /systemconfig - Update a system config
//! - GET /systemconfig/{id} - Get a system config by ID
//! - GET /systemconfigs - Find system configs page by page
//! - GET /systemconfig/count - Count system configs

use crate::{
    domain::repository::{Query as RepoQuery, RepositoryError},
    errcode,
    error::AppError,
    handlers::{self, Pagination, RequestContext, Search, parse_json, parse_query},
    state::AppState,
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::Response,
};

pub mod types;

pub use types::{CountSystemConfigResponse, CreateSystemConfigRequest, UpdateSystemConfigRequest};

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|e| AppError::cause(errcode::MALFORMED_PARAMS, format!("invalid id {raw:?}"), e))
}

/// Turns a missing record into a 404 carrying `context`.
fn not_found_as(context: &'static str) -> impl Fn(RepositoryError) -> AppError {
    move |err| match err {
        RepositoryError::NotFound => AppError::cause(errcode::NOT_FOUND, context, err),
        other => other.into(),
    }
}

/// Create a new system config.
///
/// # Endpoint
///
/// `POST /api/v1/systemconfig`
///
/// # Response
///
/// - **Success (200)**: the created record, with id and timestamps
/// - **Error (400)**: undecodable body, blank required field or unknown env
pub async fn create_system_config(
    State(state): State<AppState>,
    ctx: RequestContext,
    payload: Result<Json<CreateSystemConfigRequest>, JsonRejection>,
) -> Response {
    handlers::wrap(ctx, "create_system_config", async move {
        let payload = parse_json(payload)?;
        tracing::info!(?payload, "Request payload");

        let mut entity = payload.into_entity()?;
        state.system_configs.create(&mut entity).await?;

        Ok::<_, AppError>(entity)
    })
    .await
}

/// Delete a system config by ID.
///
/// `DELETE /api/v1/systemconfig/{id}`. Answers 404 when no live record has
/// that ID.
pub async fn delete_system_config(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(raw_id): Path<String>,
) -> Response {
    handlers::wrap(ctx, "delete_system_config", async move {
        tracing::info!("Request params id: {raw_id}");
        let id = parse_id(&raw_id)?;

        state
            .system_configs
            .delete(id)
            .await
            .map_err(not_found_as("failed to delete system config"))?;

        Ok::<_, AppError>(())
    })
    .await
}

/// Update a system config.
///
/// `PUT /api/v1/systemconfig`. The stored record is loaded first and only
/// the non-empty request fields overwrite it.
pub async fn update_system_config(
    State(state): State<AppState>,
    ctx: RequestContext,
    payload: Result<Json<UpdateSystemConfigRequest>, JsonRejection>,
) -> Response {
    handlers::wrap(ctx, "update_system_config", async move {
        let payload = parse_json(payload)?;
        tracing::info!(?payload, "Request payload");

        let mut existing = state
            .system_configs
            .get(payload.id)
            .await
            .map_err(not_found_as("failed to update system config"))?;

        payload.merge_into(&mut existing)?;

        state
            .system_configs
            .update(&mut existing)
            .await
            .map_err(not_found_as("failed to update system config"))?;

        Ok::<_, AppError>(existing)
    })
    .await
}

/// Get a system config by ID.
///
/// `GET /api/v1/systemconfig/{id}`
pub async fn get_system_config(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(raw_id): Path<String>,
) -> Response {
    handlers::wrap(ctx, "get_system_config", async move {
        tracing::info!("Request params id: {raw_id}");
        let id = parse_id(&raw_id)?;

        let entity = state
            .system_configs
            .get(id)
            .await
            .map_err(not_found_as("failed to get system config"))?;

        Ok::<_, AppError>(entity)
    })
    .await
}

/// Find system configs.
///
/// `GET /api/v1/systemconfigs?page=1&perPage=20&keyword=redis`
///
/// `keyword` filters on the config payload; results are ordered by ID.
pub async fn find_system_configs(
    State(state): State<AppState>,
    ctx: RequestContext,
    pagination: Result<Query<Pagination>, QueryRejection>,
    search: Result<Query<Search>, QueryRejection>,
) -> Response {
    handlers::wrap(ctx, "find_system_configs", async move {
        let pagination = parse_query(pagination)?;
        let search = parse_query(search)?;
        tracing::info!(?pagination, ?search, "Request query");

        let query = RepoQuery {
            offset: pagination.offset(),
            limit: pagination.limit(),
            keyword: search.keyword,
        };
        let entities = state.system_configs.find(&query).await?;

        Ok::<_, AppError>(entities)
    })
    .await
}

/// Count system configs.
///
/// `GET /api/v1/systemconfig/count`
pub async fn count_system_configs(State(state): State<AppState>, ctx: RequestContext) -> Response {
    handlers::wrap(ctx, "count_system_configs", async move {
        let total = state.system_configs.count().await?;
        Ok::<_, AppError>(CountSystemConfigResponse { total })
    })
    .await
}
