//! OpenAI and ElevenLabs adapters against an in-process fake server.

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Json;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use storyreel_config::{StoryreelConfig, TtsProvider};
use storyreel_core::ScriptOutput;
use storyreel_interface::{AudioGenerator, CompletionRequestBuilder, TextDriver};
use storyreel_models::{
    ElevenLabsSpeechGenerator, OpenAiChatDriver, OpenAiSpeechGenerator, RetryPolicy,
};
use tempfile::TempDir;

#[derive(Default)]
struct Fake {
    /// Requests answered with 503 before the first success
    failures_before_success: usize,
    calls: AtomicUsize,
    bodies: Mutex<Vec<Value>>,
    headers: Mutex<Vec<HeaderMap>>,
}

async fn chat(
    State(fake): State<Arc<Fake>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    let call = fake.calls.fetch_add(1, Ordering::SeqCst);
    fake.bodies.lock().unwrap().push(body);
    fake.headers.lock().unwrap().push(headers);
    if call < fake.failures_before_success {
        return (StatusCode::SERVICE_UNAVAILABLE, "overloaded").into_response();
    }
    Json(json!({
        "choices": [{ "message": { "role": "assistant", "content": "  {\"title\":\"T\",\"script\":\"S\"}\n" } }]
    }))
    .into_response()
}

async fn unauthorized(State(fake): State<Arc<Fake>>) -> (StatusCode, &'static str) {
    fake.calls.fetch_add(1, Ordering::SeqCst);
    (StatusCode::UNAUTHORIZED, "invalid api key")
}

async fn speech(
    State(fake): State<Arc<Fake>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Vec<u8> {
    fake.bodies.lock().unwrap().push(body);
    fake.headers.lock().unwrap().push(headers);
    b"ID3fake-mp3".to_vec()
}

async fn spawn(fake: Arc<Fake>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let app = Router::new()
        .route("/v1/chat/completions", post(chat))
        .route("/bad/chat/completions", post(unauthorized))
        .route("/v1/audio/speech", post(speech))
        .route("/v1/text-to-speech/:voice", post(speech))
        .with_state(fake);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    base
}

#[tokio::test]
async fn test_chat_retries_transient_status_then_succeeds() {
    let fake = Arc::new(Fake {
        failures_before_success: 2,
        ..Default::default()
    });
    let base = spawn(fake.clone()).await;
    let driver = OpenAiChatDriver::new("sk-test", format!("{}/v1", base), "gpt-4o")
        .with_retry_policy(RetryPolicy::new(1, 3, 1));

    let request = CompletionRequestBuilder::default()
        .system("You write scripts.")
        .user("Explain tides")
        .max_tokens(1000u32)
        .json_output(true)
        .build()
        .unwrap();
    let content = driver.complete(&request).await.unwrap();

    assert_eq!(content, "{\"title\":\"T\",\"script\":\"S\"}");
    assert_eq!(fake.calls.load(Ordering::SeqCst), 3);

    let bodies = fake.bodies.lock().unwrap();
    assert_eq!(bodies[0]["model"], "gpt-4o");
    assert_eq!(bodies[0]["max_tokens"], 1000);
    assert_eq!(bodies[0]["response_format"]["type"], "json_object");
    assert_eq!(bodies[0]["messages"][0]["role"], "system");
    assert_eq!(bodies[0]["messages"][1]["content"], "Explain tides");
    assert!(bodies[0].get("temperature").is_none());

    let headers = fake.headers.lock().unwrap();
    assert_eq!(headers[0]["authorization"], "Bearer sk-test");
}

#[tokio::test]
async fn test_chat_does_not_retry_client_errors() {
    let fake = Arc::new(Fake::default());
    let base = spawn(fake.clone()).await;
    let driver = OpenAiChatDriver::new("sk-bad", format!("{}/bad", base), "gpt-4o")
        .with_retry_policy(RetryPolicy::new(1, 3, 1));

    let request = CompletionRequestBuilder::default().user("hi").build().unwrap();
    let err = driver.complete(&request).await.unwrap_err();

    assert!(err.is_provider());
    assert!(err.to_string().contains("HTTP 401"));
    assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
}

fn config(base: &str, output: &std::path::Path) -> StoryreelConfig {
    let mut config = StoryreelConfig::default();
    config.output.dir = output.to_path_buf();
    config.providers.openai.base_url = format!("{}/v1", base);
    config.providers.openai.api_key = Some("sk-test".to_string());
    config.providers.elevenlabs.base_url = format!("{}/v1", base);
    config.providers.elevenlabs.api_key = Some("xi-test".to_string());
    config.audio.provider = TtsProvider::OpenAi;
    config
}

#[tokio::test]
async fn test_openai_speech_writes_narration_file() {
    let fake = Arc::new(Fake::default());
    let base = spawn(fake.clone()).await;
    let dir = TempDir::new().unwrap();

    let generator = OpenAiSpeechGenerator::from_config(&config(&base, dir.path())).unwrap();
    let path = generator
        .generate(&ScriptOutput::new("Tides", "The moon pulls the sea."))
        .await
        .unwrap();

    assert!(path.starts_with(dir.path().join("audio")));
    assert_eq!(path.extension().unwrap(), "mp3");
    assert_eq!(std::fs::read(&path).unwrap(), b"ID3fake-mp3");

    let bodies = fake.bodies.lock().unwrap();
    assert_eq!(bodies[0]["input"], "The moon pulls the sea.");
    assert_eq!(bodies[0]["voice"], "alloy");
    assert_eq!(bodies[0]["model"], "tts-1");
}

#[tokio::test]
async fn test_elevenlabs_speech_uses_voice_and_key_header() {
    let fake = Arc::new(Fake::default());
    let base = spawn(fake.clone()).await;
    let dir = TempDir::new().unwrap();

    let generator = ElevenLabsSpeechGenerator::from_config(&config(&base, dir.path())).unwrap();
    let path = generator
        .generate(&ScriptOutput::new("Tides", "The moon pulls the sea."))
        .await
        .unwrap();

    assert!(path.exists());
    let headers = fake.headers.lock().unwrap();
    assert_eq!(headers[0]["xi-api-key"], "xi-test");
    let bodies = fake.bodies.lock().unwrap();
    assert_eq!(bodies[0]["text"], "The moon pulls the sea.");
    assert_eq!(bodies[0]["model_id"], "eleven_multilingual_v2");
}

#[test]
fn test_missing_key_fails_at_construction() {
    let config = StoryreelConfig::default();
    let err = OpenAiChatDriver::from_config(&config).unwrap_err();
    assert!(err.to_string().contains("OpenAI API key is required"));
    assert!(ElevenLabsSpeechGenerator::from_config(&config).is_err());
}
