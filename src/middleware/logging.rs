//! Request logging middleware

use std::time::Instant;

use axum::{body::Body, extract::Request, middleware::Next, response::Response};
use tracing::{info, warn};

/// Log method, path, battle action, status and latency of every request
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let action = query_action(request.uri().query()).unwrap_or_default();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = format!("{:.2}", start.elapsed().as_secs_f64() * 1000.0);

    if response.status().is_server_error() {
        warn!(%method, %path, %action, status, %duration_ms, "Request failed");
    } else if response.status().is_client_error() {
        warn!(%method, %path, %action, status, %duration_ms, "Request rejected");
    } else {
        info!(%method, %path, %action, status, %duration_ms, "Request completed");
    }

    response
}

/// `action` query parameter, if present
fn query_action(query: Option<&str>) -> Option<String> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "action")
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_action() {
        assert_eq!(
            query_action(Some("battleId=b1&action=check-battle")),
            Some("check-battle".to_string())
        );
        assert_eq!(query_action(Some("battleId=b1")), None);
        assert_eq!(query_action(None), None);
    }
}
