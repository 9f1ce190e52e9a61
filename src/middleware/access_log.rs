//! HTTP access log.
//!
//! Every request produces one line on the `audit` target:
//!
//! ```text
//! [HTTP] | 2026-01-02T03:04:05Z | 200 | 1.2ms | 10.0.0.1 | GET | "/livez"
//! ```

use crate::logging::AUDIT_TARGET;
use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::{SecondsFormat, Utc};
use std::{net::SocketAddr, time::Instant};

pub async fn access_log(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let client_ip = client_ip(
        request.headers(),
        request.extensions().get::<ConnectInfo<SocketAddr>>(),
    );

    let response = next.run(request).await;

    tracing::info!(
        target: AUDIT_TARGET,
        "[HTTP] | {} | {} | {:?} | {} | {} | {:?}",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        response.status().as_u16(),
        started.elapsed(),
        client_ip,
        method,
        path,
    );

    response
}

/// First hop of `X-Forwarded-For`, then `X-Real-IP`, then the peer address.
fn client_ip(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .map(str::to_string)
        .or_else(|| peer.map(|ConnectInfo(addr)| addr.ip().to_string()))
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_prefers_proxy_headers() {
        let peer = ConnectInfo(SocketAddr::from(([192, 168, 1, 7], 4000)));

        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, Some(&peer)), "192.168.1.7");
        assert_eq!(client_ip(&headers, None), "-");

        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&headers, Some(&peer)), "10.0.0.2");

        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers, Some(&peer)), "203.0.113.9");
    }
}
