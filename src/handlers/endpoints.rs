//! Lists the API endpoints the router serves.

use axum::{
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{MethodRouter, get},
};
use std::{collections::BTreeSet, sync::Arc};

/// Method and path of every registered route, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    entries: Vec<(Method, String)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, method: Method, path: &str) {
        self.entries.push((method, path.to_string()));
    }

    /// One `METHOD\tPATH` line per route, sorted.
    pub fn listing(&self) -> String {
        let mut lines: Vec<String> = self
            .entries
            .iter()
            .map(|(method, path)| format!("{method}\t{path}"))
            .collect();
        lines.sort();
        lines.join("\n")
    }

    /// Distinct methods, sorted and comma separated.
    pub fn allow(&self) -> String {
        let methods: BTreeSet<&str> = self.entries.iter().map(|(m, _)| m.as_str()).collect();
        methods.into_iter().collect::<Vec<_>>().join(",")
    }

    /// Every route path, sorted and comma separated.
    pub fn paths(&self) -> String {
        let mut paths: Vec<&str> = self.entries.iter().map(|(_, p)| p.as_str()).collect();
        paths.sort_unstable();
        paths.join(",")
    }
}

static API_ENDPOINTS: HeaderName = HeaderName::from_static("api-endpoints");

/// `GET` lists routes as text; `OPTIONS` answers with `Allow` and
/// `API-Endpoints` headers and an empty body.
pub fn method_router<S>(table: RouteTable) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    let table = Arc::new(table);
    let for_options = Arc::clone(&table);

    get(move || {
        let table = Arc::clone(&table);
        async move { table.listing() }
    })
    .options(move || {
        let table = Arc::clone(&for_options);
        async move { options_response(&table) }
    })
}

fn options_response(table: &RouteTable) -> Response {
    let mut response = StatusCode::OK.into_response();
    let headers = response.headers_mut();
    if let Ok(allow) = HeaderValue::from_str(&table.allow()) {
        headers.insert(header::ALLOW, allow);
    }
    if let Ok(paths) = HeaderValue::from_str(&table.paths()) {
        headers.insert(API_ENDPOINTS.clone(), paths);
    }
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        let mut table = RouteTable::new();
        table.record(Method::GET, "/readyz");
        table.record(Method::POST, "/api/v1/systemconfig");
        table.record(Method::GET, "/livez");
        table.record(Method::DELETE, "/api/v1/systemconfig/{id}");
        table
    }

    #[test]
    fn listing_is_sorted() {
        assert_eq!(
            table().listing(),
            "DELETE\t/api/v1/systemconfig/{id}\nGET\t/livez\nGET\t/readyz\nPOST\t/api/v1/systemconfig"
        );
    }

    #[test]
    fn allow_and_paths_are_sorted_and_joined() {
        let table = table();
        assert_eq!(table.allow(), "DELETE,GET,POST");
        assert_eq!(
            table.paths(),
            "/api/v1/systemconfig,/api/v1/systemconfig/{id},/livez,/readyz"
        );
    }
}
