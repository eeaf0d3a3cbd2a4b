//! HTTP-level tests for the alerts API
//!
//! Run with: cargo test --features server --test api_routes_integration

#![cfg(feature = "server")]

mod helpers;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use helpers::*;
use tom_alerts_dash::api::{create_router, AppState, PageRenderer};
use tom_alerts_dash::SessionStore;

fn build_test_app(fetcher: Arc<MockFetcher>) -> axum::Router {
    let state = AppState {
        sessions: Arc::new(SessionStore::new(Arc::new(registry(fetcher)), target_store())),
        pages: Arc::new(PageRenderer::new().unwrap()),
    };
    create_router(state)
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn new_session(app: &axum::Router) -> String {
    let (status, body) = send(app, "POST", "/api/sessions", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_lists_brokers() {
    let app = build_test_app(Arc::new(MockFetcher::new()));
    let (status, body) = send(&app, "GET", "/api/health", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["brokers"], json!(["MARS", "ALeRCE", "SCIMMA"]));
}

#[tokio::test]
async fn test_session_describes_panels() {
    let app = build_test_app(Arc::new(MockFetcher::new()));
    let (_, body) = send(&app, "POST", "/api/sessions", json!({})).await;

    let brokers = body["brokers"].as_array().unwrap();
    assert_eq!(brokers.len(), 3);
    assert_eq!(brokers[0]["name"], "MARS");
    assert_eq!(brokers[0]["wiring"]["table_id"], "alerts-table-MARS");
}

#[tokio::test]
async fn test_query_then_create_targets() {
    let alerts = mars_alerts(3);
    let fetcher = Arc::new(fetcher_for_all(&alerts, &[], &[]));
    let app = build_test_app(fetcher.clone());
    let id = new_session(&app).await;

    let (status, selection) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/select", id),
        json!({"new_selection": "MARS"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(selection["heading"], "MARS Alerts");

    let query = json!({"token": 1, "filters": {"page_current": 0, "values": {}}});
    let uri = format!("/api/sessions/{}/query/MARS", id);
    let (status, update) = send(&app, "POST", &uri, query.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(update["rows"].as_array().unwrap().len(), 3);
    assert_eq!(update["rows"][0]["alert"], alerts[0]);

    // same click again
    let (status, _) = send(&app, "POST", &uri, query).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(fetcher.requests().len(), 1);

    let (status, messages) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/targets", id),
        json!({"trigger_count": 1, "selected_rows": [2]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        messages[0]["text"],
        format!(
            "Successfully created [{}](/targets/1/)",
            alerts[2]["objectId"].as_str().unwrap()
        )
    );
    assert_eq!(messages[0]["severity"], "success");
}

#[tokio::test]
async fn test_ended_session_is_freed() {
    let sessions = Arc::new(SessionStore::new(
        Arc::new(registry(Arc::new(MockFetcher::new()))),
        target_store(),
    ));
    let app = create_router(AppState {
        sessions: sessions.clone(),
        pages: Arc::new(PageRenderer::new().unwrap()),
    });

    let first = new_session(&app).await;
    let _second = new_session(&app).await;
    assert_eq!(sessions.len().await, 2);

    let uri = format!("/api/sessions/{}", first);
    let (status, _) = send(&app, "DELETE", &uri, Value::Null).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(sessions.len().await, 1);

    let (status, _) = send(&app, "DELETE", &uri, Value::Null).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/select", first),
        json!({"new_selection": "MARS"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validate_is_gated_by_the_handled_click() {
    let fetcher = Arc::new(fetcher_for_all(&mars_alerts(1), &[], &[]));
    let app = build_test_app(fetcher);
    let id = new_session(&app).await;

    let query = json!({"token": 1, "filters": {"values": {}}});
    let (status, _) = send(&app, "POST", &format!("/api/sessions/{}/query/MARS", id), query).await;
    assert_eq!(status, StatusCode::OK);

    let validate = format!("/api/sessions/{}/validate/MARS", id);
    let partial = json!({"mars-ra": "10"});
    let (status, _) = send(
        &app,
        "POST",
        &validate,
        json!({"token": 1, "filters": {"values": partial}}),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, messages) = send(
        &app,
        "POST",
        &validate,
        json!({"token": 2, "filters": {"values": partial}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages.as_array().map(|m| m.len()), Some(1));
}

#[tokio::test]
async fn test_validate_reports_partial_cone() {
    let app = build_test_app(Arc::new(MockFetcher::new()));
    let id = new_session(&app).await;

    let (status, messages) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/validate/ALeRCE", id),
        json!({"token": 1, "filters": {"values": {"alerce-ra": "10"}}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        messages[0]["text"],
        "__all__: All of RA, Dec, and Search Radius must be included to execute a cone search."
    );
}

#[tokio::test]
async fn test_unknown_session_and_broker() {
    let app = build_test_app(Arc::new(MockFetcher::new()));
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/select", uuid::Uuid::new_v4()),
        json!({"new_selection": "MARS"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let id = new_session(&app).await;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/query/Lasair", id),
        json!({"token": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pages_render() {
    let app = build_test_app(Arc::new(MockFetcher::new()));
    for uri in ["/alerts/", "/alerts/browse/"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        if uri == "/alerts/browse/" {
            assert!(html.contains("id=\"alerts-container-SCIMMA\""));
            assert!(html.contains("id=\"broker-selection\""));
        } else {
            assert!(html.contains("Browse Alerts"));
        }
    }
}
