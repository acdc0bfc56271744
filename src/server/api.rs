use crate::agent::{ ChatAgent, ChatError };
use crate::render::{ card::render_index, PageRenderer, Pages, RenderStrategy };
use crate::weather::{ fetch_or_placeholder, WeatherSource, WeatherTarget };
use std::sync::Arc;
use std::time::Duration;
use axum::{
    body::Bytes,
    routing::{ get, post },
    Router,
    Json,
    extract::State,
    response::{ Html, IntoResponse, Response },
    http::{ header, HeaderValue, StatusCode },
};
use serde::{ Deserialize, Serialize };
use serde_json::Value as JsonValue;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, warn };

pub const RENDER_STRATEGY_HEADER: &str = "x-render-strategy";

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ChatReply {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Clone)]
pub struct AppState {
    pub agent: ChatAgent,
    pub weather: Arc<dyn WeatherSource>,
    pub target: WeatherTarget,
    pub pages: Pages,
    pub revalidate: Duration,
}

impl AppState {
    pub fn new(
        agent: ChatAgent,
        weather: Arc<dyn WeatherSource>,
        target: WeatherTarget,
        revalidate: Duration
    ) -> Self {
        let pages = Pages::new(weather.clone(), target.clone(), revalidate);
        Self { agent, weather, target, pages, revalidate }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = match &self {
            ChatError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ChatError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/ssg", get(ssg_handler))
        .route("/ssr", get(ssr_handler))
        .route("/isr", get(isr_handler))
        .route("/edge", get(edge_handler))
        .route("/api/data", get(data_handler))
        .route("/api/chat", post(chat_handler))
        .layer(cors)
        .with_state(state)
}

async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&RenderStrategy::all(state.revalidate)))
}

async fn page_response(page: &PageRenderer) -> Response {
    let rendered = page.render().await;
    info!(
        "Rendered {} in {:.2}ms",
        rendered.strategy.path(),
        rendered.render_time.as_secs_f64() * 1000.0
    );

    let mut response = Html(rendered.html).into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&rendered.strategy.cache_control()) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    headers.insert(RENDER_STRATEGY_HEADER, HeaderValue::from_static(rendered.strategy.short_name()));
    response
}

async fn ssg_handler(State(state): State<AppState>) -> Response {
    page_response(&state.pages.ssg).await
}

async fn ssr_handler(State(state): State<AppState>) -> Response {
    page_response(&state.pages.ssr).await
}

async fn isr_handler(State(state): State<AppState>) -> Response {
    page_response(&state.pages.isr).await
}

async fn edge_handler(State(state): State<AppState>) -> Response {
    page_response(&state.pages.edge).await
}

async fn data_handler(State(state): State<AppState>) -> Response {
    let snapshot = fetch_or_placeholder(state.weather.as_ref(), &state.target).await;
    let mut response = Json(snapshot).into_response();
    response.headers_mut().insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<ChatReply>, ChatError> {
    let body: JsonValue = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected chat request with invalid JSON: {}", e);
        ChatError::InvalidInput(format!("Invalid JSON body: {}", e))
    })?;

    let message = state.agent.handle(&body).await?;
    Ok(Json(ChatReply { message }))
}
