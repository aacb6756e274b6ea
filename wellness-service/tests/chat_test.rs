mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wellness_service::services::fallback::{CHAT_EMPTY_REPLY, CHAT_FALLBACK};
use wellness_service::services::providers::mock::MockTextProvider;
use wellness_service::services::ProviderError;
use wiremock::ResponseTemplate;

#[tokio::test]
async fn healthy_upstream_returns_generated_reply() {
    let stub = GeminiStub::start().await;
    stub.mock_text(CHAT_PATH, "It sounds like a heavy week. Want to talk through it?")
        .await;
    let app = gemini_router(&stub.uri(), Some(TEST_API_KEY));

    let (status, body) = post_json(
        &app,
        "/chat-gemini",
        json!({"message": "I'm overwhelmed by exams", "language": "en"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "response": "It sounds like a heavy week. Want to talk through it?",
            "success": true
        })
    );
}

#[tokio::test]
async fn outbound_request_carries_prompt_history_and_safety_settings() {
    let stub = GeminiStub::start().await;
    stub.mock_text(CHAT_PATH, "ok").await;
    let app = gemini_router(&stub.uri(), Some(TEST_API_KEY));

    post_json(
        &app,
        "/chat-gemini",
        json!({
            "message": "still can't sleep",
            "conversationHistory": [
                {"sender": "user", "text": "I can't sleep"},
                {"sender": "bot", "text": "That sounds exhausting."}
            ]
        }),
    )
    .await;

    let bodies = stub.received_bodies().await;
    assert_eq!(bodies.len(), 1);
    let sent = &bodies[0];

    let contents = sent["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 3);
    assert_eq!(contents[0]["role"], "user");
    let instruction = contents[0]["parts"][0]["text"].as_str().unwrap();
    assert!(instruction.starts_with("You are a compassionate AI wellness assistant"));
    assert!(instruction.ends_with("Current message: still can't sleep"));
    assert_eq!(contents[1], json!({"role": "user", "parts": [{"text": "I can't sleep"}]}));
    assert_eq!(
        contents[2],
        json!({"role": "model", "parts": [{"text": "That sounds exhausting."}]})
    );

    assert_eq!(
        sent["generationConfig"],
        json!({"temperature": 0.7, "topK": 40, "topP": 0.95, "maxOutputTokens": 300})
    );
    assert_eq!(
        sent["safetySettings"],
        json!([
            {"category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"},
            {"category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_MEDIUM_AND_ABOVE"}
        ])
    );
}

#[tokio::test]
async fn upstream_error_status_returns_200_with_fallback() {
    let stub = GeminiStub::start().await;
    stub.mock_status(CHAT_PATH, 500).await;
    let app = gemini_router(&stub.uri(), Some(TEST_API_KEY));

    let (status, body) = post_json(&app, "/chat-gemini", json!({"message": "hello?"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["response"], CHAT_FALLBACK);
    assert_eq!(body["error"], "Gemini API error: 500");
    // No silent retries by default
    assert_eq!(stub.received_bodies().await.len(), 1);
}

#[tokio::test]
async fn rate_limited_upstream_returns_fallback() {
    let stub = GeminiStub::start().await;
    stub.mock_status(CHAT_PATH, 429).await;
    let app = gemini_router(&stub.uri(), Some(TEST_API_KEY));

    let (status, body) = post_json(&app, "/chat-gemini", json!({"message": "hi"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["response"], CHAT_FALLBACK);
}

#[tokio::test]
async fn malformed_upstream_payload_returns_fallback() {
    let stub = GeminiStub::start().await;
    stub.mock_response(
        CHAT_PATH,
        ResponseTemplate::new(200).set_body_string("<html>not json</html>"),
    )
    .await;
    let app = gemini_router(&stub.uri(), Some(TEST_API_KEY));

    let (status, body) = post_json(&app, "/chat-gemini", json!({"message": "hi"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["response"], CHAT_FALLBACK);
}

#[tokio::test]
async fn safety_blocked_reply_gets_gentle_prompt() {
    let stub = GeminiStub::start().await;
    stub.mock_response(
        CHAT_PATH,
        ResponseTemplate::new(200)
            .set_body_json(json!({"candidates": [{"finishReason": "SAFETY"}]})),
    )
    .await;
    let app = gemini_router(&stub.uri(), Some(TEST_API_KEY));

    let (_, body) = post_json(&app, "/chat-gemini", json!({"message": "hi"})).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["response"], CHAT_EMPTY_REPLY);
}

#[tokio::test]
async fn missing_api_key_returns_fallback_without_calling_upstream() {
    let stub = GeminiStub::start().await;
    stub.mock_text(CHAT_PATH, "unused").await;
    let app = gemini_router(&stub.uri(), None);

    let (status, body) = post_json(&app, "/chat-gemini", json!({"message": "hi"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["response"], CHAT_FALLBACK);
    assert_eq!(body["error"], "GEMINI_API_KEY is not configured");
    assert!(stub.received_bodies().await.is_empty());
}

#[tokio::test]
async fn slow_upstream_times_out_into_fallback() {
    let stub = GeminiStub::start().await;
    stub.mock_response(
        CHAT_PATH,
        ResponseTemplate::new(200)
            .set_delay(Duration::from_secs(5))
            .set_body_json(json!({"candidates": []})),
    )
    .await;
    // test_config uses a 2 second timeout
    let app = gemini_router(&stub.uri(), Some(TEST_API_KEY));

    let (status, body) = post_json(&app, "/chat-gemini", json!({"message": "hi"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Gemini API request timed out");
}

#[tokio::test]
async fn empty_message_is_rejected_before_upstream() {
    let mock = Arc::new(MockTextProvider::replying("unused"));
    let app = router_with_provider(test_config("http://unused", None), mock.clone());

    let (status, body) = post_json(&app, "/chat-gemini", json!({"message": ""})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "response": CHAT_FALLBACK,
            "success": false,
            "error": "Message is required"
        })
    );
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn malformed_json_body_returns_fallback_envelope() {
    let mock = Arc::new(MockTextProvider::replying("unused"));
    let app = router_with_provider(test_config("http://unused", None), mock.clone());

    let (status, body) = post_raw(&app, "/chat-gemini", "{\"message\": ".to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "response": CHAT_FALLBACK,
            "success": false,
            "error": "Invalid request body"
        })
    );
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn unusable_history_entries_are_skipped_not_rejected() {
    let mock = Arc::new(MockTextProvider::replying("I'm listening."));
    let app = router_with_provider(test_config("http://unused", None), mock.clone());

    let (status, body) = post_json(
        &app,
        "/chat-gemini",
        json!({
            "message": "hi",
            "conversationHistory": [
                {"text": "orphan"},
                {"sender": null, "text": "null sender"},
                {"sender": "bot", "text": null},
                {"sender": "user", "text": "kept"}
            ],
            "language": 3,
            "context": ["not", "a", "string"]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "I'm listening.", "success": true}));

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    // Instruction turn plus the one usable entry
    assert_eq!(requests[0].turns.len(), 2);
    assert_eq!(requests[0].turns[1].parts, vec!["kept".to_string()]);
}

#[tokio::test]
async fn history_window_is_forwarded_untruncated() {
    let mock = Arc::new(MockTextProvider::replying("ok"));
    let app = router_with_provider(test_config("http://unused", None), mock.clone());

    let history: Vec<_> = (0..15)
        .map(|i| {
            json!({
                "sender": if i % 2 == 0 { "user" } else { "bot" },
                "text": format!("turn {}", i)
            })
        })
        .collect();

    let (_, body) = post_json(
        &app,
        "/chat-gemini",
        json!({"message": "hi", "conversationHistory": history}),
    )
    .await;

    assert_eq!(body["success"], true);
    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    // Instruction turn plus all 15 history entries
    assert_eq!(requests[0].turns.len(), 16);
    assert_eq!(requests[0].turns[15].parts[0], "turn 14");
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let mock = Arc::new(MockTextProvider::replying("ok"));
    mock.push_outcome(Err(ProviderError::Timeout));
    let app = router_with_provider(test_config("http://unused", None), mock.clone());

    let (a, b) = tokio::join!(
        post_json(&app, "/chat-gemini", json!({"message": "first"})),
        post_json(&app, "/chat-gemini", json!({"message": "second"})),
    );

    // Exactly one of the two consumed the scripted failure
    let successes = [a.1["success"].as_bool(), b.1["success"].as_bool()]
        .iter()
        .filter(|s| **s == Some(true))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(mock.call_count(), 2);
}
