use async_trait::async_trait;
use axum::body::{ to_bytes, Body };
use axum::http::{ header, Request, StatusCode };
use axum::Router;
use serde_json::{ json, Value };
use std::sync::atomic::{ AtomicUsize, Ordering };
use std::sync::{ Arc, Mutex };
use std::time::Duration;
use tower::ServiceExt;

use weather_playground::agent::{ ChatAgent, MISSING_MESSAGES };
use weather_playground::config::prompt::{ SystemPrompt, WEATHER_SYSTEM_PROMPT };
use weather_playground::llm::chat::CompletionProvider;
use weather_playground::llm::LlmError;
use weather_playground::models::chat::{ ChatMessage, Role };
use weather_playground::models::weather::{ Coordinates, WeatherSnapshot };
use weather_playground::server::api::{ router, AppState, RENDER_STRATEGY_HEADER };
use weather_playground::weather::{ WeatherError, WeatherSource, WeatherTarget };

struct FakeProvider {
    seen: Mutex<Vec<Vec<ChatMessage>>>,
    fail: bool,
}

#[async_trait]
impl CompletionProvider for FakeProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        if self.fail {
            return Err(LlmError::Api { status: 429, message: "Rate limit reached".into() });
        }
        Ok("Expect light rain this afternoon.".into())
    }

    fn get_model(&self) -> String {
        "fake".into()
    }
}

struct FakeWeather {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl WeatherSource for FakeWeather {
    async fn fetch(&self, _: Coordinates, location: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(WeatherError::Malformed("offline".into()));
        }
        Ok(WeatherSnapshot::new(location, 22.5, 14.0))
    }
}

struct Harness {
    app: Router,
    provider: Arc<FakeProvider>,
    weather: Arc<FakeWeather>,
}

fn harness(system_prompt: Option<&str>, provider_fails: bool, weather_fails: bool) -> Harness {
    let provider = Arc::new(FakeProvider { seen: Mutex::new(Vec::new()), fail: provider_fails });
    let weather = Arc::new(FakeWeather { calls: AtomicUsize::new(0), fail: weather_fails });
    let agent = ChatAgent::new(provider.clone(), system_prompt.map(SystemPrompt::inline));
    let state = AppState::new(agent, weather.clone(), WeatherTarget::default(), Duration::from_secs(30));
    Harness { app: router(state), provider, weather }
}

async fn post_chat(app: &Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn chat_rejects_non_array_messages() {
    let h = harness(Some(WEATHER_SYSTEM_PROMPT), false, false);

    let (status, body) = post_chat(&h.app, json!({ "messages": "not an array" }).to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], MISSING_MESSAGES);
    assert!(h.provider.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn chat_rejects_invalid_json() {
    let h = harness(None, false, false);

    let (status, body) = post_chat(&h.app, "{ not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
}

#[tokio::test]
async fn chat_returns_message_for_single_user_turn() {
    let h = harness(Some(WEATHER_SYSTEM_PROMPT), false, false);

    let (status, body) = post_chat(
        &h.app,
        json!({ "messages": [{ "role": "user", "content": "Will it rain?" }] }).to_string()
    ).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Expect light rain this afternoon.");

    let seen = h.provider.seen.lock().unwrap();
    assert_eq!(seen[0].len(), 2);
    assert_eq!(seen[0][0].role, Role::System);
    assert_eq!(seen[0][0].content, WEATHER_SYSTEM_PROMPT);
    assert_eq!(seen[0][1], ChatMessage::user("Will it rain?"));
}

#[tokio::test]
async fn chat_without_prompt_forwards_verbatim() {
    let h = harness(None, false, false);

    let (status, _) = post_chat(
        &h.app,
        json!({ "messages": [
            { "role": "user", "content": "hi" },
            { "role": "assistant", "content": "hello" },
            { "role": "user", "content": "forecast?" }
        ] }).to_string()
    ).await;

    assert_eq!(status, StatusCode::OK);
    let seen = h.provider.seen.lock().unwrap();
    assert_eq!(seen[0].len(), 3);
    assert!(seen[0].iter().all(|m| m.role != Role::System));
}

#[tokio::test]
async fn chat_provider_failure_is_500() {
    let h = harness(Some(WEATHER_SYSTEM_PROMPT), true, false);

    let (status, body) = post_chat(
        &h.app,
        json!({ "messages": [{ "role": "user", "content": "hi" }] }).to_string()
    ).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Rate limit reached");
}

#[tokio::test]
async fn data_endpoint_returns_snapshot() {
    let h = harness(None, false, false);

    let (status, headers, body) = get(&h.app, "/api/data").await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
    assert_eq!(body["temp"], 22.5);
    assert_eq!(body["wind"], 14.0);
    assert_eq!(body["location"], "New York City, NY");
}

#[tokio::test]
async fn data_endpoint_serves_placeholder_on_failure() {
    let h = harness(None, false, true);

    let (status, _, body) = get(&h.app, "/api/data").await;
    let body: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["temp"], "Unavailable");
    assert_eq!(body["wind"], "Unavailable");
    assert_eq!(body["location"], "New York City, NY");
}

#[tokio::test]
async fn pages_render_with_their_labels_and_directives() {
    let h = harness(None, false, false);

    let cases = [
        ("/ssg", "Build-time", "SSG", "immutable"),
        ("/ssr", "Server runtime", "SSR", "no-store"),
        ("/isr", "Cached (30s)", "ISR", "s-maxage=30"),
        ("/edge", "Edge Function", "Edge", "no-store"),
    ];

    for (path, label, short, directive) in cases {
        let (status, headers, html) = get(&h.app, path).await;

        assert_eq!(status, StatusCode::OK, "{}", path);
        assert!(html.contains(&format!("Rendered via {}", label)), "{}", path);
        assert!(html.contains("22.5°C"), "{}", path);
        assert!(html.contains("14 km/h"), "{}", path);
        assert!(html.contains("New York City, NY"), "{}", path);
        assert_eq!(headers.get(RENDER_STRATEGY_HEADER).unwrap(), short);
        assert!(
            headers.get(header::CACHE_CONTROL).unwrap().to_str().unwrap().contains(directive),
            "{}",
            path
        );
    }
}

#[tokio::test]
async fn static_page_is_fetched_once() {
    let h = harness(None, false, false);

    for _ in 0..3 {
        get(&h.app, "/ssg").await;
    }
    assert_eq!(h.weather.calls.load(Ordering::SeqCst), 1);

    for _ in 0..2 {
        get(&h.app, "/ssr").await;
    }
    assert_eq!(h.weather.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn index_lists_pages() {
    let h = harness(None, false, false);

    let (status, _, html) = get(&h.app, "/").await;

    assert_eq!(status, StatusCode::OK);
    for path in ["/ssg", "/ssr", "/isr", "/edge"] {
        assert!(html.contains(path));
    }
}
