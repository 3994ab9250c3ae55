//! Router-level tests for the coaching API, driven through `tower::oneshot`
//! with mock generator/sink implementations.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use api::core::advice::AdviceGenerator;
use api::core::app_state::AppState;
use api::core::sink::ExchangeSink;
use coaching_store::{errors::StoreError, exchange::CoachingExchange};
use cohere_service::{
    chat_service::ChatMessage,
    error_handler::{ChatError, LlmError},
};

const TEST_MODEL: &str = "command-r-test";

/// What the mock generator should do per call.
enum MockReply {
    Text(&'static str),
    NoText,
    Fail,
}

struct MockGenerator {
    reply: MockReply,
    calls: Arc<AtomicUsize>,
    last_messages: Mutex<Vec<ChatMessage>>,
}

impl MockGenerator {
    fn new(reply: MockReply) -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let generator = Arc::new(Self {
            reply,
            calls: calls.clone(),
            last_messages: Mutex::new(Vec::new()),
        });
        (generator, calls)
    }
}

#[async_trait]
impl AdviceGenerator for MockGenerator {
    async fn generate(&self, messages: Vec<ChatMessage>) -> Result<Option<String>, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages;
        match self.reply {
            MockReply::Text(text) => Ok(Some(text.to_string())),
            MockReply::NoText => Ok(None),
            MockReply::Fail => Err(ChatError::HttpStatus {
                status: StatusCode::TOO_MANY_REQUESTS,
                url: "https://api.cohere.com/v2/chat".into(),
                snippet: "quota exceeded".into(),
            }
            .into()),
        }
    }
}

struct MockSink {
    delay: Duration,
    fail: bool,
    writes: Arc<Mutex<Vec<CoachingExchange>>>,
}

impl MockSink {
    fn new(delay: Duration, fail: bool) -> (Arc<Self>, Arc<Mutex<Vec<CoachingExchange>>>) {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::new(Self {
            delay,
            fail,
            writes: writes.clone(),
        });
        (sink, writes)
    }
}

#[async_trait]
impl ExchangeSink for MockSink {
    async fn record(&self, exchange: CoachingExchange) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.writes.lock().unwrap().push(exchange);
        if self.fail {
            return Err(StoreError::HttpStatus {
                status: StatusCode::FORBIDDEN,
                url: "https://firestore.googleapis.com".into(),
                snippet: "permission denied".into(),
            });
        }
        Ok(())
    }
}

fn make_app(
    advice: Arc<dyn AdviceGenerator>,
    sink: Option<Arc<dyn ExchangeSink>>,
) -> axum::Router {
    api::app(
        AppState {
            advice,
            sink,
            model: TEST_MODEL.to_string(),
        },
        Vec::new(),
    )
}

fn post_advice(payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/coach/advice")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_service_and_parseable_timestamp() {
    let (generator, _) = MockGenerator::new(MockReply::Text("hi"));
    let app = make_app(generator, None);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["service"], "soberstride-api");
    let ts = body["ts"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
}

#[tokio::test]
async fn advice_happy_path_returns_model_and_advice() {
    let (generator, calls) = MockGenerator::new(MockReply::Text("Stay strong..."));
    let (sink, writes) = MockSink::new(Duration::ZERO, false);
    let app = make_app(generator.clone(), Some(sink));

    let response = app
        .oneshot(post_advice(&json!({
            "prompt": "I want to relapse tonight",
            "daysSober": 14,
            "cravingLevel": 8
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["model"], TEST_MODEL);
    assert_eq!(body["advice"], "Stay strong...");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // The conversation carries the fixed system prompt and interpolated user message.
    let messages = generator.last_messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].content.contains("SoberStride Coach"));
    assert_eq!(
        messages[1].content,
        "Language: en-ZA, Days sober: 14, Craving level: 8, Request: I want to relapse tonight"
    );

    // The detached write eventually lands with the defaulted language.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let written = writes.lock().unwrap();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].language, "en-ZA");
    assert_eq!(written[0].advice, "Stay strong...");
    assert_eq!(written[0].days_sober, Some(14));
}

#[tokio::test]
async fn missing_prompt_is_rejected_before_generator_runs() {
    let (generator, calls) = MockGenerator::new(MockReply::Text("unused"));
    let app = make_app(generator, None);

    let response = app.oneshot(post_advice(&json!({}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("prompt"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_prompt_is_rejected_before_generator_runs() {
    let (generator, calls) = MockGenerator::new(MockReply::Text("unused"));
    let app = make_app(generator, None);

    let response = app
        .oneshot(post_advice(&json!({"prompt": ""})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("prompt:"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn craving_level_out_of_range_fails_validation() {
    let (generator, calls) = MockGenerator::new(MockReply::Text("unused"));
    let app = make_app(generator, None);

    for payload in [
        json!({"prompt": "hi", "cravingLevel": 11}),
        json!({"prompt": "hi", "cravingLevel": -1}),
        json!({"prompt": "hi", "cravingLevel": 4.5}),
    ] {
        let response = app.clone().oneshot(post_advice(&payload)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_language_is_rejected() {
    let (generator, calls) = MockGenerator::new(MockReply::Text("unused"));
    let app = make_app(generator, None);

    let response = app
        .oneshot(post_advice(&json!({"prompt": "hi", "language": "fr-FR"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn generator_failure_maps_to_bad_gateway() {
    let (generator, _) = MockGenerator::new(MockReply::Fail);
    let (sink, writes) = MockSink::new(Duration::ZERO, false);
    let app = make_app(generator, Some(sink));

    let response = app
        .oneshot(post_advice(&json!({"prompt": "rough day"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("HTTP status"));

    // No exchange is constructed after a failed model call.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(writes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_model_reply_substitutes_fallback() {
    let (generator, _) = MockGenerator::new(MockReply::NoText);
    let app = make_app(generator, None);

    let response = app
        .oneshot(post_advice(&json!({"prompt": "rough day"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["advice"], "Unable to generate advice right now.");
}

#[tokio::test]
async fn response_does_not_wait_for_slow_sink() {
    let (generator, _) = MockGenerator::new(MockReply::Text("Stay strong..."));
    let (sink, writes) = MockSink::new(Duration::from_millis(800), false);
    let app = make_app(generator, Some(sink));

    let started = Instant::now();
    let response = app
        .oneshot(post_advice(&json!({"prompt": "rough day"})))
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        elapsed < Duration::from_millis(400),
        "response waited on the sink: {elapsed:?}"
    );
    assert!(writes.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert_eq!(writes.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn sink_failure_never_surfaces_to_the_caller() {
    let (generator, _) = MockGenerator::new(MockReply::Text("Stay strong..."));
    let (sink, writes) = MockSink::new(Duration::ZERO, true);
    let app = make_app(generator, Some(sink));

    let response = app
        .oneshot(post_advice(&json!({"prompt": "rough day"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["advice"], "Stay strong...");

    // The failing write was still attempted.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(writes.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn unmatched_path_returns_structured_404() {
    let (generator, _) = MockGenerator::new(MockReply::Text("unused"));
    let app = make_app(generator, None);

    let response = app
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["path"], "/nope");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (generator, calls) = MockGenerator::new(MockReply::Text("unused"));
    let app = make_app(generator, None);

    let huge = "x".repeat(2 * 1024 * 1024);
    let response = app
        .oneshot(post_advice(&json!({"prompt": huge})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn hardening_headers_are_set() {
    let (generator, _) = MockGenerator::new(MockReply::Text("unused"));
    let app = make_app(generator, None);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
}
