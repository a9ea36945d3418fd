//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod battle;
pub mod health;

use axum::{Router, middleware};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    constants::API_BASE_PATH,
    middleware::{auth::auth_middleware, logging::logging_middleware},
    state::AppState,
};

/// Create all API routes
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new().merge(health::routes()).merge(
        battle::routes().route_layer(middleware::from_fn_with_state(state, auth_middleware)),
    )
}

/// The full application with middleware, ready to serve
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest(API_BASE_PATH, routes(state.clone()))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::test_utils::{PASSING_SOURCE, bearer, test_state};

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str, who: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(who) = who {
            builder = builder.header(header::AUTHORIZATION, bearer(who));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post(who: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/battle")
            .header(header::AUTHORIZATION, bearer(who))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = app(test_state());
        let (status, body) = send(&app, get("/api/v1/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let app = app(test_state());
        let (status, body) = send(&app, get("/api/v1/battle?action=join-queue", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let app = app(test_state());
        let request = Request::builder()
            .uri("/api/v1/battle?action=join-queue")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bad_actions_are_rejected() {
        let app = app(test_state());

        let (status, _) = send(&app, get("/api/v1/battle?action=dance", Some("alice"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, get("/api/v1/battle", Some("alice"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            get("/api/v1/battle?action=check-battle", Some("alice")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, post("alice", json!({ "action": "dance" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, post("alice", json!({ "action": "submit-code" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_battle_is_not_found() {
        let app = app(test_state());
        let (status, body) = send(
            &app,
            get(
                "/api/v1/battle?action=check-battle&battleId=nonexistent-id",
                Some("alice"),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_battle_flow() {
        let app = app(test_state());

        let (status, body) = send(&app, get("/api/v1/battle?action=join-queue", Some("alice"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matched"], false);
        assert_eq!(body["queuePosition"], 1);

        let (status, _) = send(&app, get("/api/v1/battle?action=join-queue", Some("alice"))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(&app, get("/api/v1/battle?action=join-queue", Some("bob"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matched"], true);
        assert_eq!(body["opponent"], "alice");
        assert_eq!(body["starterCode"], "function sum(a, b) {\n}\n");
        let battle_id = body["battleId"].as_str().unwrap().to_string();

        let (_, body) = send(&app, get("/api/v1/battle?action=queue-status", Some("alice"))).await;
        assert_eq!(body["queued"], false);
        assert_eq!(body["battleId"], battle_id.as_str());

        let (status, body) = send(
            &app,
            get(
                &format!("/api/v1/battle?action=check-battle&battleId={}", battle_id),
                Some("bob"),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["battle"]["status"], "active");

        let (status, _) = send(
            &app,
            post(
                "mallory",
                json!({ "action": "submit-code", "battleId": battle_id, "code": PASSING_SOURCE }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            post(
                "alice",
                json!({ "action": "submit-code", "battleId": battle_id, "code": PASSING_SOURCE }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["allPassed"], true);
        assert_eq!(body["winner"], "alice");
        assert_eq!(body["testResults"].as_array().unwrap().len(), 2);

        let (status, body) = send(
            &app,
            post(
                "bob",
                json!({ "action": "submit-code", "battleId": battle_id, "code": PASSING_SOURCE }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "ALREADY_COMPLETED");
    }

    #[tokio::test]
    async fn test_leave_queue() {
        let app = app(test_state());
        send(&app, get("/api/v1/battle?action=join-queue", Some("alice"))).await;

        let (status, body) = send(&app, post("alice", json!({ "action": "leave-queue" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["removed"], true);

        let (_, body) = send(&app, post("alice", json!({ "action": "leave-queue" }))).await;
        assert_eq!(body["removed"], false);
    }
}
