use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use flowsplit::api::{self, AppState};
use flowsplit::config::Config;
use flowsplit::datasource::{DataSourceError, MockEventSource};
use flowsplit::domain::{EventKind, HistoricalEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tower::util::ServiceExt;

const PAYER: &str = "0x00000000000000aa";

fn setup_test_app(source: MockEventSource) -> axum::Router {
    let config = Config::from_env_map(HashMap::new()).unwrap();
    api::create_router(AppState::new(config, Arc::new(source)))
}

fn event(id: &str, kind: EventKind, amount: &str, secs: i64) -> HistoricalEvent {
    HistoricalEvent {
        id: id.to_string(),
        kind,
        subscription_id: Some("1".to_string()),
        payer: Some(PAYER.to_string()),
        payee: Some("0x00000000000000bb".to_string()),
        amount: Some(amount.to_string()),
        interval: None,
        grace_period: None,
        timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
        block_height: 10,
        transaction_id: id.to_string(),
    }
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_transactions_returns_events() {
    let source = MockEventSource::new().with_events(vec![
        event("t2", EventKind::Executed, "80", 200),
        event("t1", EventKind::Created, "50", 100),
    ]);
    let app = setup_test_app(source);

    let (status, json) = get_json(app, &format!("/transactions/{}", PAYER)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["address"], PAYER);
    assert_eq!(json["count"], 2);
    assert_eq!(json["source"], "findlabs");
    assert_eq!(json["events"][0]["type"], "PayoutExecuted");
    assert_eq!(json["events"][0]["amount"], "80");
    assert_eq!(json["events"][1]["subscriptionID"], "1");
}

#[tokio::test]
async fn test_transactions_address_is_lowercased() {
    let app = setup_test_app(MockEventSource::new());
    let (status, json) = get_json(app, "/transactions/0x00000000000000AA").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["address"], PAYER);
    assert_eq!(json["source"], "fallback");
}

#[tokio::test]
async fn test_transactions_invalid_address() {
    for bad in ["abc", "0x123", "0xzzzzzzzzzzzzzzzz", "00000000000000aaaa"] {
        let app = setup_test_app(MockEventSource::new());
        let (status, json) = get_json(app, &format!("/transactions/{}", bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "address {}", bad);
        assert!(json["error"].is_string());
    }
}

#[tokio::test]
async fn test_transactions_indexer_failure_falls_back() {
    let source = MockEventSource::new().failing(DataSourceError::HttpError {
        status: 503,
        message: "Server error".to_string(),
    });
    let app = setup_test_app(source);

    let (status, json) = get_json(app, &format!("/transactions/{}", PAYER)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 0);
    assert_eq!(json["events"], serde_json::json!([]));
    assert_eq!(json["source"], "fallback");
}

#[tokio::test]
async fn test_summary_shares() {
    let source = MockEventSource::new().with_events(vec![
        event("t3", EventKind::Canceled, "0", 300),
        event("t2", EventKind::Executed, "80.5", 200),
        event("t1", EventKind::Created, "50", 100),
    ]);
    let app = setup_test_app(source);

    let (status, json) = get_json(app, &format!("/v1/summary/{}", PAYER)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["eventCount"], 3);
    assert_eq!(json["shares"]["payouts"], 67);
    assert_eq!(json["shares"]["other"], 33);
    assert_eq!(json["latestAmount"], "80.50");
    assert_eq!(json["totalDistributed"], "80.50");
    assert_eq!(json["activeMembers"], 1);
    assert_eq!(json["memberShares"][0]["payee"], "0x00000000000000bb");
    assert_eq!(json["memberShares"][0]["share"], 100);

    let next = chrono::DateTime::parse_from_rfc3339(json["nextPayment"].as_str().unwrap()).unwrap();
    assert_eq!(
        next.with_timezone(&Utc),
        Utc.timestamp_opt(200, 0).unwrap() + chrono::Duration::days(30)
    );
}

#[tokio::test]
async fn test_summary_without_history() {
    let app = setup_test_app(MockEventSource::new());
    let (status, json) = get_json(app, &format!("/v1/summary/{}", PAYER)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalDistributed"], "0.00");
    assert_eq!(json["memberShares"], serde_json::json!([]));
    assert_eq!(json["activeMembers"], 0);
    assert!(json["nextPayment"].is_null());
    assert!(json["latestAmount"].is_null());
}

#[tokio::test]
async fn test_summary_upstream_failure_is_502() {
    let source = MockEventSource::new().failing(DataSourceError::RateLimited);
    let app = setup_test_app(source);
    let (status, json) = get_json(app, &format!("/v1/summary/{}", PAYER)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("Failed to analyze history"));
}
