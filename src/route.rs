//! Route registration.
//!
//! Every route added through [`Routes::add`] is also recorded in a
//! [`RouteTable`], which `/endpoints` serves.

use crate::{
    handlers::{debug, endpoints, health, systemconfig},
    state::AppState,
};
use axum::{
    Router,
    http::Method,
    routing::{MethodRouter, delete, get, post, put},
};
use endpoints::RouteTable;

pub const API_PREFIX: &str = "/api/v1";

struct Routes {
    router: Router<AppState>,
    table: RouteTable,
}

impl Routes {
    fn new() -> Self {
        Self {
            router: Router::new(),
            table: RouteTable::new(),
        }
    }

    fn add(mut self, method: Method, path: &str, handler: MethodRouter<AppState>) -> Self {
        self.table.record(method, path);
        self.router = self.router.route(path, handler);
        self
    }

    fn api(self, method: Method, path: &str, handler: MethodRouter<AppState>) -> Self {
        self.add(method, &format!("{API_PREFIX}{path}"), handler)
    }
}

/// Builds the application router, still waiting for its state.
pub fn router() -> Router<AppState> {
    let routes = Routes::new()
        .add(Method::GET, "/livez", get(health::livez))
        .add(Method::GET, "/readyz", get(health::readyz))
        .add(Method::GET, "/debug/vars", get(debug::vars))
        .api(
            Method::POST,
            "/systemconfig",
            post(systemconfig::create_system_config),
        )
        .api(
            Method::PUT,
            "/systemconfig",
            put(systemconfig::update_system_config),
        )
        .api(
            Method::GET,
            "/systemconfig/count",
            get(systemconfig::count_system_configs),
        )
        .api(
            Method::GET,
            "/systemconfig/{id}",
            get(systemconfig::get_system_config),
        )
        .api(
            Method::DELETE,
            "/systemconfig/{id}",
            delete(systemconfig::delete_system_config),
        )
        .api(
            Method::GET,
            "/systemconfigs",
            get(systemconfig::find_system_configs),
        );

    tracing::debug!("Registered routes:\n{}", routes.table.listing());

    routes
        .router
        .route("/endpoints", endpoints::method_router(routes.table))
}
