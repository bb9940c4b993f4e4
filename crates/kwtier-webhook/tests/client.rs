//! Integration tests for `DeliveryClient` using wiremock HTTP mocks.

use std::time::{Duration, Instant};

use kwtier_core::{Context, Keyword};
use kwtier_webhook::{DeliveryClient, DeliveryPayload};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer, max_attempts: u32, retry_delay_ms: u64) -> DeliveryClient {
    DeliveryClient::with_endpoint(
        &format!("{}/hook", server.uri()),
        5,
        max_attempts,
        retry_delay_ms,
    )
    .expect("client construction should not fail")
}

fn sample_payload() -> DeliveryPayload {
    let context = Context {
        conversion_rate: 5.0,
        average_order_value: 50.0,
        language: "en-US".to_string(),
        ..Context::default()
    };
    let keywords = [
        Keyword::new("k1", "trail shoes", 1000, 20.0),
        Keyword::new("k2", "road shoes", 500, 35.0),
    ];
    DeliveryPayload::build(&keywords, &context)
}

#[tokio::test]
async fn send_returns_validated_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "context": {"conversionRate": 5.0, "language": "en-US"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "body": {"ID": "k1", "Auto Suggest": "trail shoes men\ntrail shoes women\n"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 3, 0);
    let resp = client.send(&sample_payload()).await.expect("should succeed");

    assert_eq!(resp.id, "k1");
    assert_eq!(
        resp.suggestions(),
        vec!["trail shoes men", "trail shoes women"]
    );

    let requests = server.received_requests().await.expect("recording enabled");
    let sent: serde_json::Value = requests[0].body_json().expect("JSON request body");
    assert_eq!(sent["keywords"].as_array().map(Vec::len), Some(2));
    assert_eq!(
        sent["keywords"][0]["metrics"],
        json!({"potentialTraffic": 320, "potentialConversions": 16, "potentialRevenue": 800})
    );
}

#[tokio::test]
async fn persistent_server_error_is_attempted_three_times() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "down"})))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server, 3, 20);
    let started = Instant::now();
    let err = client
        .send(&sample_payload())
        .await
        .expect_err("should fail after retries");

    // 20 ms after the first failure, 40 ms after the second.
    assert!(started.elapsed() >= Duration::from_millis(60));
    assert!(err.message.contains("3 attempts"), "message: {}", err.message);
    assert!(err.message.contains("500"));
    assert_eq!(err.status_code, Some(500));
    assert_eq!(err.response_body, Some(json!({"error": "down"})));
}

#[tokio::test]
async fn recovers_after_transient_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({})))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "body": {"ID": "k2", "Auto Suggest": ""}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server, 3, 0);
    let resp = client.send(&sample_payload()).await.expect("second attempt succeeds");
    assert_eq!(resp.id, "k2");
    assert!(resp.suggestions().is_empty());
}

#[tokio::test]
async fn non_json_body_fails_with_http_status_attached() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Accepted"))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server, 2, 0);
    let err = client.send(&sample_payload()).await.unwrap_err();

    assert!(err.message.contains("Failed to parse response as JSON"));
    assert!(err.message.contains("2 attempts"));
    assert_eq!(err.status_code, Some(200));
    assert!(err.response_body.is_none());
}

#[tokio::test]
async fn invalid_shape_is_reported_as_400_naming_the_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "body": {"ID": "", "Auto Suggest": "x"}
        })))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server, 3, 0);
    let err = client.send(&sample_payload()).await.unwrap_err();

    assert!(err.message.contains("missing or invalid ID"), "message: {}", err.message);
    assert_eq!(err.status_code, Some(400));
}

#[tokio::test]
async fn unreachable_endpoint_fails_without_status() {
    let client = DeliveryClient::with_endpoint("http://127.0.0.1:1/hook", 2, 2, 0)
        .expect("client construction should not fail");
    let err = client.send(&sample_payload()).await.unwrap_err();

    assert!(err.message.contains("2 attempts"));
    assert!(err.status_code.is_none());
}

#[test]
fn rejects_invalid_endpoint_url() {
    let result = DeliveryClient::with_endpoint("not a url", 5, 3, 0);
    assert!(result.is_err());
}
