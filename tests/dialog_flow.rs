// tests/dialog_flow.rs

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::{json, Map, Value};

use common::MockServer;
use watson_nlc::dialog::{NLC_QUERY_KEY, NLC_RESULT_KEY};
use watson_nlc::{ConversationClient, DialogSession, NaturalLanguageClassifier, NlcConfig};

fn query_context(text: &str) -> Map<String, Value> {
    let mut context = Map::new();
    context.insert("conversation_id".to_string(), json!("conv-1"));
    context.insert(NLC_QUERY_KEY.to_string(), json!(text));
    context
}

#[tokio::test]
async fn test_query_then_message_round_trip() {
    let nlc = MockServer::ok(json!({
        "matching_results": 3,
        "results": [
            {"name": "Umbrella", "image": "https://img/u.png", "score": 0.93},
            {"name": "Raincoat", "image": "https://img/r.png", "score": 0.71},
            {"name": "Sunglasses", "image": "https://img/s.png", "score": 0.12}
        ]
    }))
    .await;
    let conversation = MockServer::ok(json!({
        "output": {"text": ["Here is what I found"]},
        "context": {"conversation_id": "conv-1"}
    }))
    .await;

    let classifier = Arc::new(NaturalLanguageClassifier::with_base_url(&nlc.url).unwrap());
    let relay = Arc::new(ConversationClient::with_base_url(&conversation.url).unwrap());
    let mut session = DialogSession::new(relay)
        .with_workspace("ws-1")
        .with_classifier(classifier, "clf-1")
        .with_score_filter(Some(0.5))
        .with_context(query_context("rain gear"));

    assert!(!session.handle_query().await.unwrap());
    assert_eq!(
        session.context()[NLC_RESULT_KEY],
        "1) Umbrella\nhttps://img/u.png\n2) Raincoat\nhttps://img/r.png"
    );
    assert_eq!(session.last_results().len(), 2);

    let classify = nlc.only_request();
    assert_eq!(classify.path, "/v1/classifiers/clf-1/classify");
    assert_eq!(classify.json(), json!({"text": "rain gear"}));

    let reply = session.get_response("show me").await.unwrap();
    assert_eq!(reply["output"]["text"][0], "Here is what I found");

    let message = conversation.only_request();
    assert_eq!(message.method, Method::POST);
    assert_eq!(message.path, "/v1/workspaces/ws-1/message");
    assert_eq!(message.query.as_deref(), Some("version=2017-05-26"));
    let body = message.json();
    assert_eq!(body["input"], json!({"text": "show me"}));
    assert_eq!(body["context"]["conversation_id"], "conv-1");
    assert_eq!(body["context"][NLC_RESULT_KEY], session.context()[NLC_RESULT_KEY]);
}

#[tokio::test]
async fn test_classifier_outage_keeps_dialog_going() {
    let nlc = MockServer::start(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({"error": "Service unavailable"}),
    )
    .await;
    let conversation = MockServer::ok(json!({"output": {"text": []}})).await;

    let config = NlcConfig {
        nlc_url: nlc.url.clone(),
        conversation_url: conversation.url.clone(),
        classifier_id: Some("clf-1".to_string()),
        workspace_id: Some("ws-1".to_string()),
        ..NlcConfig::default()
    };
    let mut session = DialogSession::from_config(&config)
        .unwrap()
        .with_context(query_context("rain gear"));

    assert!(!session.handle_query().await.unwrap());
    let result = session.context()[NLC_RESULT_KEY].as_str().unwrap();
    assert!(result.contains("503"));
    assert!(result.contains("Service unavailable"));

    session.get_response("anything else?").await.unwrap();
    assert_eq!(conversation.requests().len(), 1);
}

#[tokio::test]
async fn test_unconfigured_classifier_uses_fake_without_network() {
    let conversation = MockServer::ok(json!({})).await;
    let config = NlcConfig {
        conversation_url: conversation.url.clone(),
        fake_result: "1) Test item\nhttps://img/t.png".to_string(),
        ..NlcConfig::default()
    };
    let mut session = DialogSession::from_config(&config)
        .unwrap()
        .with_context(query_context("rain gear"));

    assert!(!session.has_classifier());
    assert!(!session.handle_query().await.unwrap());
    assert_eq!(session.context()[NLC_RESULT_KEY], "1) Test item\nhttps://img/t.png");
    assert!(conversation.requests().is_empty());
}
