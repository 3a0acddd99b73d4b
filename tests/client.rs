mod common;

use base64::prelude::{BASE64_STANDARD, Engine as _};
use common::{GenerateReply, MockOllama, closed_base_url, solid_image};
use hat_checker::{HatAnalyzer, OllamaClient, OllamaConfig, client::NO_RESPONSE};
use serde_json::json;
use std::time::Duration;

#[test]
fn returns_model_response_on_success() {
    let server = MockOllama::start(GenerateReply::Json(
        json!({ "model": "llava:latest", "response": "Rating: 7/10", "done": true }),
    ));
    let client = server.client();
    let front = solid_image(8, 6, [200, 30, 30]);

    assert_eq!(client.analyze(&front, None), "Rating: 7/10");

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let body = &requests[0];
    assert_eq!(body["model"], "llava:latest");
    assert_eq!(body["stream"], false);
    assert_eq!(body["images"].as_array().map(Vec::len), Some(1));
    let prompt = body["prompt"].as_str().unwrap_or_default();
    assert!(prompt.contains("Face Shape Compatibility"));
    assert!(!prompt.contains("both front and back views"));
}

#[test]
fn sends_both_views_as_png() {
    let server = MockOllama::start(GenerateReply::Json(json!({ "response": "Looks sharp" })));
    let client = server.client();
    let front = solid_image(4, 4, [10, 20, 30]);
    let back = solid_image(5, 3, [40, 50, 60]);

    assert_eq!(client.analyze(&front, Some(&back)), "Looks sharp");

    let body = &server.requests()[0];
    let images = body["images"].as_array().cloned().unwrap_or_default();
    assert_eq!(images.len(), 2);
    for image in images {
        let png = BASE64_STANDARD
            .decode(image.as_str().unwrap_or_default())
            .expect("base64 image");
        assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
    }
    assert!(
        body["prompt"]
            .as_str()
            .unwrap_or_default()
            .ends_with("both front and back views for a complete assessment.")
    );
}

#[test]
fn reports_bad_status() {
    let server = MockOllama::start(GenerateReply::Status(500));
    let client = server.client();

    let result = client.analyze(&solid_image(2, 2, [0, 0, 0]), None);
    assert_eq!(result, "Error: Received status code 500");
}

#[test]
fn reports_timeout_without_panicking() {
    let server = MockOllama::start(GenerateReply::Delay(Duration::from_secs(3)));
    let client = server.client_with_timeout(Duration::from_millis(300));

    let result = client.analyze(&solid_image(2, 2, [0, 0, 0]), None);
    assert!(result.starts_with("⚠️ Request timed out"), "got: {result}");
}

#[test]
fn missing_response_field_falls_back_to_placeholder() {
    let server = MockOllama::start(GenerateReply::Json(json!({ "done": true })));
    let client = server.client();

    assert_eq!(client.analyze(&solid_image(2, 2, [1, 2, 3]), None), NO_RESPONSE);
}

#[test]
fn malformed_body_is_reported_as_text() {
    let server = MockOllama::start(GenerateReply::Raw("definitely not json"));
    let client = server.client();

    let result = client.analyze(&solid_image(2, 2, [1, 2, 3]), None);
    assert!(result.starts_with("Error during analysis: "), "got: {result}");
}

#[test]
fn unreachable_service_is_reported_as_text() {
    let client = OllamaClient::new(OllamaConfig {
        base_url: closed_base_url(),
        ..OllamaConfig::default()
    })
    .expect("http client");

    assert!(!client.is_service_reachable());
    let result = client.analyze(&solid_image(2, 2, [1, 2, 3]), None);
    assert!(result.starts_with("Error during analysis: "), "got: {result}");
}

#[test]
fn health_check_succeeds_against_running_service() {
    let server = MockOllama::start(GenerateReply::Status(500));
    assert!(server.client().is_service_reachable());
    assert!(server.requests().is_empty());
}

#[test]
fn health_check_rejects_non_ok_status() {
    for status in [404, 503] {
        let server = MockOllama::start_with_tags(status, GenerateReply::Status(500));
        assert!(
            !server.client().is_service_reachable(),
            "tags status {status} must not count as reachable"
        );
        assert!(server.requests().is_empty());
    }
}

#[test]
fn exposes_configured_model() {
    let client = OllamaClient::new(OllamaConfig {
        model: "bakllava".to_string(),
        ..OllamaConfig::default()
    })
    .expect("http client");
    assert_eq!(client.model(), "bakllava");
}
