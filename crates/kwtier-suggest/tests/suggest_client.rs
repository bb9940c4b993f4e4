//! Integration tests for `SuggestClient` using wiremock HTTP mocks.

use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kwtier_suggest::SuggestClient;

fn test_client(server: &MockServer) -> SuggestClient {
    SuggestClient::with_base_url(&format!("{}/complete/search", server.uri()), 5, "Mozilla/5.0")
        .expect("failed to build test SuggestClient")
}

async fn mount_suggestions(server: &MockServer, q: &str, suggestions: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/complete/search"))
        .and(query_param("q", q))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([q, suggestions])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetch_one_sends_locale_and_client_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/complete/search"))
        .and(query_param("client", "firefox"))
        .and(query_param("hl", "pt"))
        .and(query_param("gl", "PT"))
        .and(query_param("q", "sapatilhas"))
        .and(header("accept", "application/json"))
        .and(header("user-agent", "Mozilla/5.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(["sapatilhas", ["sapatilhas nike", "sapatilhas adidas"]])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let suggestions = test_client(&server).fetch_one("sapatilhas", "pt-PT").await;
    assert_eq!(suggestions, vec!["sapatilhas nike", "sapatilhas adidas"]);
}

#[tokio::test]
async fn fetch_one_returns_empty_on_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let suggestions = test_client(&server).fetch_one("shoes", "en-US").await;
    assert!(suggestions.is_empty());
}

#[tokio::test]
async fn fetch_one_returns_empty_on_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
        .mount(&server)
        .await;

    let suggestions = test_client(&server).fetch_one("shoes", "en-US").await;
    assert!(suggestions.is_empty());
}

#[tokio::test]
async fn fetch_one_returns_empty_when_unreachable() {
    let client = SuggestClient::with_base_url("http://127.0.0.1:1/complete/search", 2, "ua")
        .expect("client construction should not fail");
    assert!(client.fetch_one("shoes", "en-US").await.is_empty());
}

#[tokio::test]
async fn fetch_batch_continues_past_a_failing_keyword() {
    let server = MockServer::start().await;

    mount_suggestions(&server, "a", json!(["a1", "a2"])).await;
    Mock::given(method("GET"))
        .and(path("/complete/search"))
        .and(query_param("q", "b"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_suggestions(&server, "c", json!(["c1"])).await;

    let client = test_client(&server);
    let started = Instant::now();
    let results = client.fetch_batch(&["a", "b", "c"], "en-US", 200).await;

    assert!(
        started.elapsed() >= Duration::from_millis(400),
        "expected at least two 200 ms pauses, took {:?}",
        started.elapsed()
    );
    assert_eq!(results.len(), 3);
    assert_eq!(results["a"], vec!["a1", "a2"]);
    assert!(results["b"].is_empty());
    assert_eq!(results["c"], vec!["c1"]);
}

#[tokio::test]
async fn fetch_batch_issues_requests_in_order() {
    let server = MockServer::start().await;

    for q in ["first", "second", "third"] {
        mount_suggestions(&server, q, json!([])).await;
    }

    let client = test_client(&server);
    client
        .fetch_batch(&["first", "second", "third"], "en-US", 0)
        .await;

    let requests = server.received_requests().await.expect("recording enabled");
    let order: Vec<String> = requests
        .iter()
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "q")
                .map(|(_, v)| v.into_owned())
        })
        .collect();
    assert_eq!(order, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn fetch_batch_of_nothing_makes_no_requests() {
    let server = MockServer::start().await;
    let results = test_client(&server).fetch_batch(&[], "en-US", 200).await;
    assert!(results.is_empty());
    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests.is_empty());
}
