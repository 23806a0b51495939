use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, DefaultBodyLimit, Json, Path, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::chart::{position_of, year_to_combination};
use crate::config::ServiceConfig;
use crate::engine::AnalysisRequest;
use crate::error::{BilingualText, ChartError};
use crate::safety::RateLimiter;
use crate::services::{AnalysisCache, AnalysisService, HttpDelegate, RetryingDelegate};

// --- Error mapping: every failure renders { "error": { "vi", "en" } } ---
pub enum ServerError {
    Chart(ChartError),
    BadRequest(BilingualText),
    RateLimited,
    Internal(anyhow::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServerError::Chart(e) => (StatusCode::BAD_REQUEST, e.bilingual()),
            ServerError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ServerError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                BilingualText::new(
                    "Quá nhiều yêu cầu, vui lòng thử lại sau.",
                    "Too many requests, please try again later.",
                ),
            ),
            ServerError::Internal(e) => {
                warn!("Internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    BilingualText::new("Lỗi máy chủ, vui lòng thử lại.", "Server error, please try again."),
                )
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<ChartError> for ServerError {
    fn from(err: ChartError) -> Self {
        Self::Chart(err)
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AnalysisService>,
    pub limiter: Arc<Mutex<RateLimiter>>,
    pub started_at: String,
}

impl AppState {
    /// Wire cache, optional delegate and rate limiter from configuration.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let cache = Arc::new(AnalysisCache::new(config.cache_capacity));
        let mut service = AnalysisService::new(cache);
        if let Some(ref delegate) = config.delegate {
            info!("External delegate enabled at {}", delegate.url);
            let http = Arc::new(HttpDelegate::new(delegate.url.clone(), delegate.api_key.clone()));
            service = service.with_delegate(Arc::new(RetryingDelegate::new(http, delegate.retry)));
        }

        Self {
            service: Arc::new(service),
            limiter: Arc::new(Mutex::new(RateLimiter::new(config.rate_limit, config.rate_window))),
            started_at: chrono::Local::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
struct YearResponse {
    year: i32,
    combination: String,
    stem: String,
    branch: String,
    position: usize,
}

/// Build the HTTP router. Split from `run_server` so tests can drive it directly.
pub fn router(state: AppState, config: &ServiceConfig) -> Router {
    let api = Router::new()
        .route("/api/analyze", post(analyze_handler))
        .route("/api/year/{year}", get(year_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(CorsLayer::permissive())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: ServiceConfig) -> Result<()> {
    info!("Initializing Tứ Trụ analysis server");
    let state = AppState::from_config(&config);

    let limiter = state.limiter.clone();
    let window = config.rate_window.max(std::time::Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(window);
        loop {
            interval.tick().await;
            limiter.lock().await.prune();
        }
    });

    let app = router(state, &config);
    let listener = tokio::net::TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    info!("Server ready: http://{}", config.addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

/// Client key: peer address when known, else the first forwarded address.
fn client_key(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let client = client_key(&request);
    let allowed = state.limiter.lock().await.check(&client);
    if !allowed {
        warn!("Rate limit exceeded for {}", client);
        return ServerError::RateLimited.into_response();
    }
    next.run(request).await
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let cached = state.service.cache().len().await;
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ok", "since": state.started_at, "cached": cached })),
    )
}

async fn analyze_handler(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let Json(request) = payload.map_err(|rejection| {
        ServerError::BadRequest(BilingualText::new(
            format!("Yêu cầu không hợp lệ: {}", rejection.body_text()),
            format!("Invalid request: {}", rejection.body_text()),
        ))
    })?;

    let analysis = state.service.analyze(&request).await?;
    Ok(Json(analysis))
}

async fn year_handler(Path(raw): Path<String>) -> Result<impl IntoResponse, ServerError> {
    let year: i32 = raw.trim().parse().map_err(|_| {
        ServerError::BadRequest(BilingualText::new(
            format!("Năm không hợp lệ: \"{}\"", raw),
            format!("Invalid year: \"{}\"", raw),
        ))
    })?;

    let pair = year_to_combination(year)?;
    let position = position_of(pair).context("cycle member without a position")?;

    Ok(Json(YearResponse {
        year,
        combination: pair.to_string(),
        stem: pair.stem.to_string(),
        branch: pair.branch.to_string(),
        position,
    }))
}
