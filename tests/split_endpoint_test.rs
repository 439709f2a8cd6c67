use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use flowsplit::api::{self, AppState};
use flowsplit::config::Config;
use flowsplit::datasource::{DataSourceError, MockEventSource};
use flowsplit::domain::{EventKind, HistoricalEvent};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::util::ServiceExt;

const PAYER: &str = "0x00000000000000aa";

fn setup_test_app(source: MockEventSource) -> axum::Router {
    let config = Config::from_env_map(HashMap::new()).unwrap();
    api::create_router(AppState::new(config, Arc::new(source)))
}

fn executed(id: &str, amount: &str, secs: i64) -> HistoricalEvent {
    HistoricalEvent {
        id: id.to_string(),
        kind: EventKind::Executed,
        subscription_id: None,
        payer: Some(PAYER.to_string()),
        payee: None,
        amount: Some(amount.to_string()),
        interval: None,
        grace_period: None,
        timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
        block_height: 0,
        transaction_id: id.to_string(),
    }
}

async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn buckets(values: &[u32]) -> Value {
    let labels = ["Member A", "Member B", "Member C"];
    Value::Array(
        values
            .iter()
            .zip(labels)
            .map(|(v, label)| json!({"label": label, "percentage": v}))
            .collect(),
    )
}

#[tokio::test]
async fn test_adjust_clamps_to_remaining() {
    let app = setup_test_app(MockEventSource::new());
    let (status, json) = post_json(
        app,
        "/v1/split/adjust",
        json!({"buckets": buckets(&[40, 0, 0]), "index": 1, "value": 70}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["buckets"][0]["percentage"], 40.0);
    assert_eq!(json["buckets"][1]["percentage"], 60.0);
    assert_eq!(json["remaining"], 0.0);
}

#[tokio::test]
async fn test_adjust_rejects_overallocated_input() {
    let app = setup_test_app(MockEventSource::new());
    let (status, json) = post_json(
        app,
        "/v1/split/adjust",
        json!({"buckets": buckets(&[60, 60, 0]), "index": 2, "value": 0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("exceeds 100%"));
}

#[tokio::test]
async fn test_suggest_low_tier() {
    let source = MockEventSource::new().with_events(vec![
        executed("t3", "50", 300),
        executed("t2", "80", 200),
        executed("t1", "20", 100),
    ]);
    let app = setup_test_app(source);

    let (status, json) = post_json(app, "/v1/split/suggest", json!({"address": PAYER})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["targets"], json!([50, 30, 20]));
    assert_eq!(json["tier"], "low");
    assert_eq!(json["sampleSize"], 3);
    assert_eq!(json["profile"], "guild");
    assert_eq!(json["labels"][0], "Member A");
}

#[tokio::test]
async fn test_suggest_with_profile_and_bucket_count() {
    let source = MockEventSource::new().with_event(executed("t1", "500", 100));
    let app = setup_test_app(source);

    let (status, json) = post_json(
        app,
        "/v1/split/suggest",
        json!({"address": PAYER, "profile": "subs", "bucketCount": 2}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tier"], "high");
    let targets: Vec<u64> = serde_json::from_value(json["targets"].clone()).unwrap();
    assert_eq!(targets.len(), 2);
    assert_eq!(targets.iter().sum::<u64>(), 100);
    assert_eq!(json["labels"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_suggest_fetch_failure_is_502() {
    let source = MockEventSource::new().failing(DataSourceError::NetworkError("down".into()));
    let app = setup_test_app(source);

    let (status, json) = post_json(app, "/v1/split/suggest", json!({"address": PAYER})).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().starts_with("Failed to analyze history"));
}

#[tokio::test]
async fn test_suggest_rejects_huge_bucket_count() {
    let source = MockEventSource::new().with_event(executed("t1", "50", 100));
    let app = setup_test_app(source.clone());

    let (status, json) = post_json(
        app,
        "/v1/split/suggest",
        json!({"address": PAYER, "bucketCount": 2_000_000_000u64}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("at most 100 buckets"));
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_suggest_unknown_profile() {
    let app = setup_test_app(MockEventSource::new());
    let (status, _) = post_json(
        app,
        "/v1/split/suggest",
        json!({"address": PAYER, "profile": "vault"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_assemble_complete_allocation() {
    let app = setup_test_app(MockEventSource::new());
    let (status, json) = post_json(
        app,
        "/v1/split/assemble",
        json!({"payer": PAYER, "totalAmount": "100", "buckets": buckets(&[33, 33, 34])}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["payer"], PAYER);
    assert_eq!(json["totalAmount"], "100.00");
    assert_eq!(json["allocations"]["Member A"], "33.00");
    assert_eq!(json["allocations"]["Member B"], "33.00");
    assert_eq!(json["allocations"]["Member C"], "34.00");
    assert_eq!(json["computeLimit"], 200);
    assert!(json["script"]
        .as_str()
        .unwrap()
        .contains("import SubscriptionManagerV2 from 0xdeployer"));
}

#[tokio::test]
async fn test_assemble_incomplete_allocation() {
    let app = setup_test_app(MockEventSource::new());
    let (status, json) = post_json(
        app,
        "/v1/split/assemble",
        json!({"payer": PAYER, "totalAmount": 100, "buckets": buckets(&[40, 30, 20])}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("allocate 100%"));
}

#[tokio::test]
async fn test_assemble_oversized_amount() {
    let app = setup_test_app(MockEventSource::new());
    let (status, json) = post_json(
        app,
        "/v1/split/assemble",
        json!({
            "payer": PAYER,
            "totalAmount": "79228162514264337593543950335",
            "buckets": buckets(&[100, 0, 0])
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("too large"));
}

#[tokio::test]
async fn test_assemble_zero_amount() {
    let app = setup_test_app(MockEventSource::new());
    let (status, _) = post_json(
        app,
        "/v1/split/assemble",
        json!({"payer": PAYER, "totalAmount": 0, "buckets": buckets(&[50, 50, 0])}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
