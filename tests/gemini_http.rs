/// Wire-level tests for `GeminiClient` against a local mock server.
///
/// The mock server runs on a multi-threaded tokio runtime; the blocking client
/// is called from the test thread, outside the runtime.
use std::sync::Arc;
use std::time::Duration;

use freshbot::gemini::{GeminiClient, GeminiClientBuilder, GeminiClientTrait, GeminiError};
use freshbot::AnswerGenerator;
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/v1beta/models/gemini-test:generateContent";

fn start_server(rt: &Runtime, template: ResponseTemplate) -> MockServer {
    rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    })
}

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClientBuilder::new()
        .base_url(server.uri())
        .model("gemini-test")
        .api_key("test-key")
        .timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to create Gemini client")
}

fn answer_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

#[test]
fn ask_sends_expected_request_body() {
    let rt = Runtime::new().unwrap();
    let server = start_server(
        &rt,
        ResponseTemplate::new(200).set_body_json(answer_body("No more than 2 hours.")),
    );

    let generator = AnswerGenerator::new(Arc::new(client_for(&server)));
    let answer = generator
        .ask(
            "How long can raw chicken sit at room temperature?",
            "Raw poultry must not exceed 2 hours at room temperature.",
        )
        .unwrap();
    assert_eq!(answer, "No more than 2 hours.");

    let requests = rt.block_on(server.received_requests()).expect("request not recorded");
    assert_eq!(requests.len(), 1);
    let body: Value = requests[0].body_json().unwrap();

    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("How long can raw chicken sit at room temperature?"));
    assert!(prompt.contains("Raw poultry must not exceed 2 hours at room temperature."));
    assert_eq!(body["contents"][0]["role"], "user");

    assert_eq!(body["generationConfig"]["temperature"], 0.0);
    assert_eq!(
        body["safetySettings"],
        json!([{
            "category": "HARM_CATEGORY_DANGEROUS_CONTENT",
            "threshold": "BLOCK_ONLY_HIGH"
        }])
    );
}

#[test]
fn safety_blocked_response_is_empty_answer_not_error() {
    let rt = Runtime::new().unwrap();
    let server = start_server(
        &rt,
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        })),
    );

    let generator = AnswerGenerator::new(Arc::new(client_for(&server)));
    let response = generator.generate("q", "c").unwrap();

    assert_eq!(response.text(), "");
    assert!(response.is_blocked());
}

#[test]
fn auth_failure_surfaces_status_and_message() {
    let rt = Runtime::new().unwrap();
    let server = start_server(
        &rt,
        ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "Permission denied.", "status": "PERMISSION_DENIED"}
        })),
    );

    let client = Arc::new(client_for(&server));
    let request = AnswerGenerator::new(client.clone()).build_request("q", "c");
    let result = client.generate_content(&request);

    match result {
        Err(GeminiError::Http { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "Permission denied.");
        }
        other => panic!("expected Http error, got {:?}", other),
    }
}

#[test]
fn server_error_is_not_retried() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt, ResponseTemplate::new(503).set_body_string("overloaded"));

    let generator = AnswerGenerator::new(Arc::new(client_for(&server)));
    let result = generator.ask("q", "c");
    assert!(matches!(result, Err(GeminiError::Http { status: 503, .. })));

    let requests = rt.block_on(server.received_requests()).expect("request not recorded");
    assert_eq!(requests.len(), 1);
}

#[test]
fn malformed_body_is_serialization_error() {
    let rt = Runtime::new().unwrap();
    let server = start_server(
        &rt,
        ResponseTemplate::new(200).set_body_string("<html>not json</html>"),
    );

    let generator = AnswerGenerator::new(Arc::new(client_for(&server)));
    let result = generator.ask("q", "c");
    assert!(matches!(result, Err(GeminiError::Serialization(_))));
}

#[test]
fn slow_server_yields_timeout_error() {
    let rt = Runtime::new().unwrap();
    let server = start_server(
        &rt,
        ResponseTemplate::new(200)
            .set_body_json(answer_body("late"))
            .set_delay(Duration::from_secs(3)),
    );

    let client = GeminiClientBuilder::new()
        .base_url(server.uri())
        .model("gemini-test")
        .api_key("test-key")
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();

    let generator = AnswerGenerator::new(Arc::new(client));
    let result = generator.ask("q", "c");
    assert!(matches!(result, Err(GeminiError::Timeout(_))));
}
