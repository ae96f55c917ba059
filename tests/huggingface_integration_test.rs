//! Wiremock integration tests for HuggingFaceClient.
//!
//! These tests verify correct HTTP interaction and error handling using mocked responses.
#![cfg(feature = "huggingface")]

use std::sync::Arc;
use std::time::Duration;

use docclass::providers::HuggingFaceClient;
use docclass::{Category, DocclassError, DocumentClassifier};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "typeform/distilbert-base-uncased-mnli";

async fn mount_status(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(format!("/models/{MODEL}")))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> HuggingFaceClient {
    HuggingFaceClient::with_base_url("test_key", MODEL, server.uri()).unwrap()
}

/// Test successful zero-shot classification request.
#[tokio::test]
async fn test_classify_success() {
    let mock_server = MockServer::start().await;

    // HuggingFace zero-shot returns labels and scores, best first
    let classify_response = serde_json::json!({
        "sequence": "Patient presents with elevated blood pressure.",
        "labels": ["Health", "Work", "Legal", "Education", "Finance", "Travel"],
        "scores": [0.81, 0.07, 0.05, 0.03, 0.02, 0.02]
    });

    Mock::given(method("POST"))
        .and(path(format!("/models/{MODEL}")))
        .and(header("Authorization", "Bearer test_key"))
        .and(body_partial_json(serde_json::json!({
            "parameters": {
                "candidate_labels": ["Education", "Work", "Health", "Finance", "Travel", "Legal"]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(classify_response))
        .mount(&mock_server)
        .await;

    let classifier = DocumentClassifier::new(Arc::new(client(&mock_server)));
    let result = classifier
        .classify_text("Patient presents with elevated blood pressure.")
        .await
        .expect("classify should succeed");

    assert_eq!(result.category, Category::Health);
    assert!((result.confidence - 0.81).abs() < 0.001);
}

/// Scores arriving out of order are re-ranked.
#[tokio::test]
async fn test_classify_unsorted_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/models/{MODEL}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "labels": ["Travel", "Finance"],
            "scores": [0.2, 0.8]
        })))
        .mount(&mock_server)
        .await;

    let classification = client(&mock_server)
        .classify("invoice", &["Travel", "Finance"])
        .await
        .unwrap();

    assert_eq!(classification.predictions[0].label, "Finance");
    assert_eq!(classification.model, MODEL);
}

/// Custom hypothesis templates are forwarded.
#[tokio::test]
async fn test_hypothesis_template_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/models/{MODEL}")))
        .and(body_partial_json(serde_json::json!({
            "parameters": { "hypothesis_template": "This document is about {}." }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "labels": ["Legal"],
            "scores": [1.0]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server).hypothesis_template("This document is about {}.");
    client.classify("contract", &["Legal"]).await.unwrap();
}

/// Test 401 Unauthorized returns AuthenticationFailed.
#[tokio::test]
async fn test_error_401_unauthorized() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, 401).await;

    let result = client(&mock_server).classify("text", &["Work"]).await;
    assert!(matches!(result, Err(DocclassError::AuthenticationFailed)));
}

/// Test 404 Not Found returns ModelNotFound.
#[tokio::test]
async fn test_error_404_model_not_found() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, 404).await;

    match client(&mock_server).classify("text", &["Work"]).await {
        Err(DocclassError::ModelNotFound(model)) => assert_eq!(model, MODEL),
        other => panic!("expected ModelNotFound, got {:?}", other),
    }
}

/// Test 429 Too Many Requests returns RateLimited error with retry-after.
#[tokio::test]
async fn test_error_429_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/models/{MODEL}")))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&mock_server)
        .await;

    match client(&mock_server).classify("text", &["Work"]).await {
        Err(DocclassError::RateLimited { retry_after }) => {
            assert_eq!(
                retry_after,
                Some(Duration::from_secs(30)),
                "retry_after should be 30 seconds"
            );
        }
        other => panic!("expected RateLimited, got {:?}", other),
    }
}

/// Test 503 Service Unavailable (model loading).
#[tokio::test]
async fn test_error_503_model_loading() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, 503).await;

    match client(&mock_server).classify("text", &["Work"]).await {
        Err(DocclassError::Api { status, message }) => {
            assert_eq!(status, 503);
            assert!(message.contains("loading"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

/// Test other status codes map to a generic API error.
#[tokio::test]
async fn test_error_500_generic() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, 500).await;

    let result = client(&mock_server).classify("text", &["Work"]).await;
    assert!(matches!(result, Err(DocclassError::Api { status: 500, .. })));
}

/// An empty label list in the response is an error, not a result.
#[tokio::test]
async fn test_empty_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/models/{MODEL}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "labels": [],
            "scores": []
        })))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).classify("text", &["Work"]).await;
    assert!(matches!(result, Err(DocclassError::EmptyResponse)));
}

/// Errors surface as the report's error message.
#[tokio::test]
async fn test_error_becomes_report() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, 401).await;

    let classifier = DocumentClassifier::new(Arc::new(client(&mock_server)));
    let report = docclass::Report::from(classifier.classify_text("text").await);
    assert_eq!(report.to_json_line(), r#"{"error":"authentication failed"}"#);
}
