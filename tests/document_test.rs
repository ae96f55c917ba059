mod common;

use std::sync::Arc;

use async_trait::async_trait;
use docclass::document::{self, extract_text};
use docclass::providers::ClassifyProvider;
use docclass::{
    Category, Classification, DocclassError, Document, DocumentClassifier, MAX_TEXT_CHARS, Report,
    Result,
};

#[test]
fn extracts_text_from_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hello.pdf");
    common::write_pdf(&path, &["Hello World"]);

    let text = extract_text(&path).unwrap();
    assert!(text.contains("Hello World"), "got {text:?}");
}

#[test]
fn load_keeps_first_thousand_characters() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("long.pdf");
    let line = "The quarterly budget review covers revenue and expenses.";
    common::write_pdf(&path, &[line; 40]);

    let full = extract_text(&path).unwrap();
    assert!(full.chars().count() > MAX_TEXT_CHARS);

    let doc = Document::load(&path).unwrap();
    assert_eq!(doc.text.chars().count(), MAX_TEXT_CHARS);
    assert!(full.starts_with(&doc.text));
    assert_eq!(doc.path, path);
}

#[test]
fn page_without_text_is_blank() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank.pdf");
    common::write_pdf(&path, &[]);

    let doc = Document::load(&path).unwrap();
    assert!(doc.is_blank());
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.pdf");

    let err = Document::load(&path).unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
    assert!(err.to_string().contains("missing.pdf"));
}

#[test]
fn non_pdf_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.pdf");
    std::fs::write(&path, "just some text").unwrap();

    match Document::load(&path) {
        Err(DocclassError::InvalidPdf(p)) => assert_eq!(p, path),
        other => panic!("expected InvalidPdf, got {other:?}"),
    }
}

#[test]
fn in_memory_extraction_matches_file() {
    let bytes = common::pdf_bytes(&["Boarding pass"]);
    let text = document::extract_text_from_mem(&bytes).unwrap();
    assert!(text.contains("Boarding pass"));
}

// ============================================================================
// Full document flow with a stub provider
// ============================================================================

/// Scores "Travel" highest whenever the text mentions a flight.
struct KeywordProvider;

#[async_trait]
impl ClassifyProvider for KeywordProvider {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn classify_zero_shot(&self, text: &str, labels: &[&str]) -> Result<Classification> {
        let scores: Vec<f32> = labels
            .iter()
            .map(|l| {
                if *l == "Travel" && text.contains("flight") {
                    0.9
                } else {
                    0.02
                }
            })
            .collect();
        Ok(Classification::from_scores(labels, &scores, "keyword"))
    }
}

#[tokio::test]
async fn classify_document_reports_category() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("itinerary.pdf");
    common::write_pdf(&path, &["Your flight to Lisbon departs at 09:40"]);

    let classifier = DocumentClassifier::new(Arc::new(KeywordProvider));
    match classifier.classify_document(&path).await {
        Report::Classified(result) => {
            assert_eq!(result.category, Category::Travel);
            assert!((result.confidence - 0.9).abs() < 1e-6);
        }
        other => panic!("expected a classification, got {other:?}"),
    }
}

#[tokio::test]
async fn classify_document_blank_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank.pdf");
    common::write_pdf(&path, &[]);

    let classifier = DocumentClassifier::new(Arc::new(KeywordProvider));
    let report = classifier.classify_document(&path).await;
    assert_eq!(report.to_json_line(), r#"{"error":"No text found in PDF"}"#);
}

#[tokio::test]
async fn classify_document_missing_file() {
    let classifier = DocumentClassifier::new(Arc::new(KeywordProvider));
    let report = classifier
        .classify_document("/nonexistent/dir/report.pdf")
        .await;

    match report {
        Report::Error { error } => {
            assert!(error.starts_with("/nonexistent/dir/report.pdf: "));
            assert!(error.contains("No such file"), "got {error}");
        }
        other => panic!("expected an error, got {other:?}"),
    }
}
