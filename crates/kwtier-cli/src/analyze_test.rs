use super::*;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tier2() -> Tier {
    Tier::new(2).expect("valid tier")
}

fn context() -> Context {
    Context {
        conversion_rate: 5.0,
        average_order_value: 50.0,
        language: "pt-PT".to_string(),
        ..Context::default()
    }
}

fn seeded_keywords() -> Vec<Keyword> {
    let mut k2 = Keyword::new("k2", "trail shoes", 500, 35.0);
    k2.auto_suggestions = Some(vec!["old suggestion".to_string()]);
    vec![
        Keyword::new("k1", "running shoes", 1000, 20.0),
        k2,
        Keyword::new("k3", "sandals", 15, 5.0),
    ]
}

async fn seeded_store() -> (SqlitePool, String) {
    let pool = kwtier_db::connect_in_memory().await.expect("in-memory pool");
    let project = kwtier_db::create_project(&pool, "Shoes", &context())
        .await
        .expect("create_project");
    kwtier_db::save_tier(&pool, &project.id, tier2(), &seeded_keywords())
        .await
        .expect("seed tier");
    (pool, project.id)
}

fn client(server: &MockServer, max_attempts: u32) -> DeliveryClient {
    DeliveryClient::with_endpoint(&format!("{}/hook", server.uri()), 5, max_attempts, 0)
        .expect("client construction should not fail")
}

async fn mount_reply(server: &MockServer, id: &str, auto_suggest: &str) {
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "body": { "ID": id, "Auto Suggest": auto_suggest }
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn find<'a>(keywords: &'a [Keyword], id: &str) -> &'a Keyword {
    keywords
        .iter()
        .find(|k| k.id == id)
        .unwrap_or_else(|| panic!("keyword {id} missing"))
}

#[tokio::test]
async fn empty_selection_is_rejected_without_delivery() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let (pool, project_id) = seeded_store().await;
    let mut session = TierSession::load(&pool, &project_id, tier2())
        .await
        .expect("load session");

    let err = session
        .analyze_selected(&client(&server, 3), &pool, &context())
        .await
        .expect_err("should fail");

    assert!(matches!(err, AnalyzeError::NothingSelected));
    assert_eq!(session.keywords(), seeded_keywords().as_slice());
    assert!(!session.is_analyzing());
}

#[tokio::test]
async fn addressed_keyword_receives_suggestions_and_tier_is_saved() {
    let server = MockServer::start().await;
    mount_reply(&server, "k1", "running shoes men\n running shoes women \n\n").await;
    let (pool, project_id) = seeded_store().await;
    let mut session = TierSession::load(&pool, &project_id, tier2())
        .await
        .expect("load session");
    assert!(session.select("k1"));
    assert!(session.select("k2"));

    let outcome = session
        .analyze_selected(&client(&server, 3), &pool, &context())
        .await
        .expect("analysis should succeed");

    assert_eq!(
        outcome,
        AnalyzeOutcome {
            addressed_id: "k1".to_string(),
            updated: true,
            suggestion_count: 2,
        }
    );
    assert!(!session.is_analyzing());
    assert_eq!(session.analyzed_count(), 0);

    let k1 = find(session.keywords(), "k1");
    assert_eq!(
        k1.auto_suggestions.as_deref(),
        Some(&["running shoes men".to_string(), "running shoes women".to_string()][..])
    );
    assert_eq!(k1.potential_traffic, Some(320));
    assert_eq!(k1.potential_conversions, Some(16));
    assert_eq!(k1.potential_revenue, Some(800));

    // Selected but not addressed: metrics refreshed, suggestions unchanged.
    let k2 = find(session.keywords(), "k2");
    assert_eq!(k2.auto_suggestions, Some(vec!["old suggestion".to_string()]));
    assert_eq!(k2.potential_traffic, Some(160));

    // Not selected: untouched.
    assert_eq!(find(session.keywords(), "k3"), &seeded_keywords()[2]);
    assert!(session.keywords().iter().all(|k| !k.is_analyzing));

    let stored = kwtier_db::load_tier(&pool, &project_id, tier2())
        .await
        .expect("load_tier");
    assert_eq!(stored, session.keywords());
}

#[tokio::test]
async fn payload_contains_only_selected_keywords() {
    let server = MockServer::start().await;
    mount_reply(&server, "k3", "sandals summer").await;
    let (pool, project_id) = seeded_store().await;
    let mut session = TierSession::load(&pool, &project_id, tier2())
        .await
        .expect("load session");
    assert!(session.select("k3"));

    session
        .analyze_selected(&client(&server, 3), &pool, &context())
        .await
        .expect("analysis should succeed");

    let requests = server.received_requests().await.expect("recording enabled");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
    let keywords = body["keywords"].as_array().expect("keywords array");
    assert_eq!(keywords.len(), 1);
    assert_eq!(keywords[0]["id"], "k3");
    assert_eq!(keywords[0]["metrics"]["potentialTraffic"], 5);
    assert_eq!(keywords[0]["metrics"]["potentialConversions"], 0);
    assert_eq!(body["context"]["language"], "pt-PT");
}

#[tokio::test]
async fn reply_for_unselected_keyword_updates_nothing() {
    let server = MockServer::start().await;
    mount_reply(&server, "k3", "sandals summer").await;
    let (pool, project_id) = seeded_store().await;
    let mut session = TierSession::load(&pool, &project_id, tier2())
        .await
        .expect("load session");
    assert!(session.select("k1"));

    let outcome = session
        .analyze_selected(&client(&server, 3), &pool, &context())
        .await
        .expect("analysis should succeed");

    assert!(!outcome.updated);
    assert_eq!(outcome.addressed_id, "k3");
    assert!(session.keywords().iter().all(|k| k.id == "k2" || k.auto_suggestions.is_none()));
}

#[tokio::test]
async fn delivery_failure_clears_flags_and_keeps_suggestions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
        .expect(2)
        .mount(&server)
        .await;
    let (pool, project_id) = seeded_store().await;
    let mut session = TierSession::load(&pool, &project_id, tier2())
        .await
        .expect("load session");
    assert!(session.select("k2"));

    let err = session
        .analyze_selected(&client(&server, 2), &pool, &context())
        .await
        .expect_err("should fail");

    match err {
        AnalyzeError::Delivery(e) => {
            assert!(e.message.contains("after 2 attempts"), "message: {}", e.message);
            assert_eq!(e.status_code, Some(500));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!session.is_analyzing());
    assert_eq!(session.analyzed_count(), 0);
    assert!(session.keywords().iter().all(|k| !k.is_analyzing));
    assert_eq!(
        find(session.keywords(), "k2").auto_suggestions,
        Some(vec!["old suggestion".to_string()])
    );

    let stored = kwtier_db::load_tier(&pool, &project_id, tier2())
        .await
        .expect("load_tier");
    assert_eq!(stored, seeded_keywords());
}

#[tokio::test]
async fn save_failure_leaves_suggestions_untouched() {
    let server = MockServer::start().await;
    mount_reply(&server, "k1", "running shoes men").await;
    let (pool, project_id) = seeded_store().await;
    let mut session = TierSession::load(&pool, &project_id, tier2())
        .await
        .expect("load session");
    assert!(session.select("k1"));
    kwtier_db::delete_project(&pool, &project_id)
        .await
        .expect("delete project");

    let err = session
        .analyze_selected(&client(&server, 3), &pool, &context())
        .await
        .expect_err("should fail");

    assert!(matches!(err, AnalyzeError::Persist(DbError::NotFound { .. })));
    assert!(find(session.keywords(), "k1").auto_suggestions.is_none());
    assert!(session.keywords().iter().all(|k| !k.is_analyzing));
    assert!(!session.is_analyzing());
}

#[test]
fn select_rejects_unknown_ids() {
    let mut session = TierSession::new("p1", tier2(), seeded_keywords());

    assert!(session.select("k1"));
    assert!(!session.select("missing"));

    session.select_all();
    assert_eq!(session.selected.len(), 3);
}
