//! Integration tests for the engine API router
//!
//! These drive the axum router in-process with `tower::ServiceExt::oneshot`;
//! no listener is bound.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use plume::config::Config;
use plume::server::{AppState, EngineServer, ServerConfig};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn test_server() -> EngineServer {
    let state = AppState::from_config(&Config::default()).unwrap();
    let config = ServerConfig::builder()
        .enable_request_logging(false)
        .build();
    EngineServer::new(config, state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = test_server();
    let router = server.build_router();

    let response = router
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("healthy"));
}

#[tokio::test]
async fn test_plan_then_read_calendar() {
    let server = test_server();
    let router = server.build_router();

    let response = router
        .clone()
        .oneshot(post_json(
            "/api/plan",
            json!({
                "keywords": [
                    { "text": "seo local", "search_volume": 1200, "difficulty_score": 35, "trend": "up" },
                    { "text": "backlinks", "search_volume": 900, "difficulty_score": 55, "trend": "flat" }
                ],
                "start_date": "2025-01-01"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["scheduled_date"], json!("2025-01-01"));
    assert_eq!(items[1]["scheduled_date"], json!("2025-01-04"));

    // The placements are readable back per-day
    let response = router
        .clone()
        .oneshot(
            Request::get("/api/calendar/2025-01-04")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // And the full snapshot lists both days
    let response = router
        .oneshot(Request::get("/api/calendar").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["days"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_difficulty_rejected() {
    let server = test_server();
    let router = server.build_router();

    let response = router
        .oneshot(post_json(
            "/api/plan",
            json!({
                "keywords": [
                    { "text": "seo", "search_volume": 10, "difficulty_score": 101, "trend": "up" }
                ],
                "start_date": "2025-01-01"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_reschedule_unknown_item_is_404() {
    let server = test_server();
    let router = server.build_router();

    let response = router
        .oneshot(post_json(
            &format!("/api/items/{}/reschedule", Uuid::new_v4()),
            json!({ "from": "2025-01-01", "to": "2025-01-10" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_publish_with_bad_mode_is_400() {
    let server = test_server();
    let router = server.build_router();

    let response = router
        .oneshot(post_json(
            &format!("/api/items/{}/publish", Uuid::new_v4()),
            json!({ "site_id": Uuid::new_v4(), "mode": "live" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bad_calendar_date_is_400() {
    let server = test_server();
    let router = server.build_router();

    let response = router
        .oneshot(
            Request::get("/api/calendar/01-2025-05")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
