//! Drives the management router in-process, without binding a socket.

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use campaign_management::{
    management_router, FixedClock, ManagementState, ManagementStore, RecordingNotifier, StrategyService,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let service = StrategyService::new(
        Arc::new(ManagementStore::new()),
        Arc::new(RecordingNotifier::new()),
        Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 9, 10).unwrap())),
    );
    management_router(ManagementState::new(Arc::new(service), "api-test"))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

async fn create_project(app: &Router, billing_model: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/management/projects",
        Some(json!({
            "name": "Back to School",
            "clientName": "Acme",
            "billingModel": billing_model,
            "startDate": "2024-09-05",
            "endDate": "2024-09-15"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

fn strategy_body(project_id: &str) -> Value {
    json!({
        "projectId": project_id,
        "name": "Prospecting - Display",
        "grossBudget": "5000",
        "agencyPercentage": "10",
        "platformPercentage": "80",
        "contractedDelivery": "100000",
        "spendToDate": "1800",
        "deliveredToDate": "40000",
        "kpi": "CPM",
        "startDate": "2024-09-05"
    })
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_strategy_returns_metrics() {
    let app = app();
    let project_id = create_project(&app, "TD").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/management/strategies",
        Some(strategy_body(&project_id)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(decimal(&body["netBudget"]), dec!(4500));
    assert_eq!(decimal(&body["platformBudget"]), dec!(3600));
    assert_eq!(decimal(&body["platformCoefficient"]), dec!(0.72));
    assert_eq!(decimal(&body["remainingPerDay"]), dec!(360));
    assert_eq!(body["daysRemaining"], 5);
    assert_eq!(body["canRaiseMargin"], true);
    assert_eq!(body["canLowerMargin"], false);
    assert_eq!(body["status"], "planned");

    let (status, list) = send(
        &app,
        Method::GET,
        &format!("/api/v1/management/projects/{project_id}/strategies"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_strategy_for_missing_project_is_not_found() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/management/strategies",
        Some(strategy_body("6f1c2a9e-0000-4000-8000-000000000000")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "project_not_found");

    let (_, list) = send(&app, Method::GET, "/api/v1/management/strategies", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn negative_budget_is_rejected() {
    let app = app();
    let project_id = create_project(&app, "TD").await;
    let mut body = strategy_body(&project_id);
    body["grossBudget"] = json!("-10");

    let (status, body) = send(&app, Method::POST, "/api/v1/management/strategies", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_failed");
}

#[tokio::test]
async fn update_recomputes_and_status_change_persists() {
    let app = app();
    let project_id = create_project(&app, "TD").await;
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/v1/management/strategies",
        Some(strategy_body(&project_id)),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/management/strategies/{id}"),
        Some(json!({"spendToDate": "1440"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&updated["projectedSuccessRate"]), dec!(100));
    assert_eq!(updated["canRaiseMargin"], false);

    let (status, paused) = send(
        &app,
        Method::POST,
        &format!("/api/v1/management/strategies/{id}/status"),
        Some(json!({"status": "paused"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paused["status"], "paused");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/management/strategies/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &format!("/api/v1/management/strategies/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn preview_does_not_persist() {
    let app = app();
    let project_id = create_project(&app, "FEE").await;

    let (status, metrics) = send(
        &app,
        Method::POST,
        "/api/v1/management/strategies/preview",
        Some(strategy_body(&project_id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&metrics["platformBudget"]), dec!(5000));
    assert!(metrics["platformCoefficient"].is_null());
    assert!(metrics["canRaiseMargin"].is_null());

    let (_, list) = send(&app, Method::GET, "/api/v1/management/strategies", None).await;
    assert!(list.as_array().unwrap().is_empty());
}
