//! The HTTP server: router, middleware stack and serve loop.

use crate::{
    db::DbPool,
    domain::repository::SystemConfigRepository,
    errcode,
    error::AppError,
    handlers::REQUEST_ID_HEADER,
    middleware::{access_log::access_log, timeout::timeout},
    persistence::PgSystemConfigRepository,
    route,
    state::AppState,
};
use axum::{
    Router,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::{any::Any, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// Everything the server needs, assembled from the option groups.
#[derive(Clone)]
pub struct Config {
    pub logging_directory: PathBuf,
    pub pool: Option<DbPool>,
    /// Empty allows any origin
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,
    /// Masked options served on `/debug/vars`
    pub published: Value,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging_directory: PathBuf::from("."),
            pool: None,
            cors_allowed_origins: Vec::new(),
            request_timeout: Duration::from_secs(
                crate::options::network::DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
            published: Value::Null,
        }
    }
}

pub struct AppServer {
    config: Config,
    router: Router,
}

impl AppServer {
    /// Builds the server over the PostgreSQL repository.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let Some(pool) = config.pool.clone() else {
            anyhow::bail!("a database pool is required");
        };
        let repository = Arc::new(PgSystemConfigRepository::new(pool));
        Ok(Self::with_repository(config, repository))
    }

    /// Builds the server over any repository. `config.pool` only feeds the
    /// readiness check here.
    pub fn with_repository(config: Config, repository: Arc<dyn SystemConfigRepository>) -> Self {
        let state = AppState::new(repository, config.pool.clone())
            .with_published(config.published.clone());
        let router = build_router(&config, state);
        Self { config, router }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Prepares the environment the server writes to.
    pub fn pre_run(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.config.logging_directory)?;
        Ok(())
    }

    /// Serves until ctrl-c or SIGTERM, then drains in-flight requests.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

fn build_router(config: &Config, state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER.clone(), MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER.clone()))
        .layer(from_fn(access_log))
        .layer(cors_layer(&config.cors_allowed_origins))
        .layer(CompressionLayer::new())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn_with_state(config.request_timeout, timeout));

    route::router().layer(middleware).with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin)
        .expose_headers([REQUEST_ID_HEADER.clone()]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(AnyOrigin);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin.trim_end_matches('/')).ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %detail, "Handler panicked");
    AppError::cause(errcode::INTERNAL_ERROR, "handler panicked", detail).into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "Failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections ...");
}
