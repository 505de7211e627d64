// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the bot verdict service.
//!
//! Front-end applications POST the visitor's address and User-Agent to
//! `/api/detect_bot` and receive the verdict with its signal breakdown.

use crate::classifier::{BotClassifier, ClassificationRequest, SignalBreakdown};
use crate::config::Config;
use crate::error::{AppError, ConfigError};
use crate::limiter::RateLimiter;
use crate::metrics::Metrics;
use crate::reputation::{ReputationAdapter, ReputationResolver};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Path of the classification endpoint.
pub const DETECT_PATH: &str = "/api/detect_bot";

/// Shared application state.
pub struct AppState {
    pub classifier: BotClassifier,
    pub metrics: Metrics,
    pub config: Config,
}

impl AppState {
    /// Wire up the classifier around the given resolver.
    pub fn new(config: Config, resolver: Arc<dyn ReputationResolver>) -> Result<Self, ConfigError> {
        let metrics = Metrics::new()?;
        let limiter = RateLimiter::new(config.rate_limit.clone());
        let reputation = ReputationAdapter::new(resolver, metrics.clone());
        let classifier =
            BotClassifier::from_config(&config.detection, limiter, reputation, metrics.clone())?;

        Ok(Self {
            classifier,
            metrics,
            config,
        })
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Classification request body.
#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
}

/// Classification response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct DetectResponse {
    pub is_bot: bool,
    /// Resolved organization, kept under its historical name
    pub isp: String,
    pub country: String,
    pub signals: SignalBreakdown,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "bot-verdict",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Classify a visitor as bot or human.
pub async fn detect_bot(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DetectRequest>, JsonRejection>,
) -> Result<Json<DetectResponse>, AppError> {
    let Json(req) = payload.map_err(|rejection| {
        debug!(error = %rejection, "Rejected malformed request body");
        AppError::InvalidRequest("Missing user_agent or IP.".to_string())
    })?;

    let request = ClassificationRequest::new(req.ip.as_deref(), req.user_agent.as_deref())
        .map_err(|err| {
            debug!(error = %err, "Rejected incomplete request");
            AppError::from(err)
        })?;

    let result = state.classifier.classify(&request).await;

    Ok(Json(DetectResponse {
        is_bot: result.is_bot,
        isp: result.signals.organization.clone(),
        country: result.country,
        signals: result.signals,
    }))
}

/// Answer bare `OPTIONS` requests that are not CORS preflights.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Reject any other method on the classification endpoint.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Prometheus scrape endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    state.metrics.set_tracked_sources(state.classifier.limiter().tracked_sources());
    let body = state
        .metrics
        .encode()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

/// Render a panic inside a handler as the generic failure response.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::Internal(detail).into_response()
}

/// Build the CORS layer from the configured origin allow-list.
fn cors_layer(config: &Config) -> Result<CorsLayer, ConfigError> {
    let origins = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| ConfigError::InvalidOrigin(origin.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if origins.is_empty() {
        warn!("No allowed origins configured, browsers will reject cross-origin calls");
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::OPTIONS, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Result<Router, ConfigError> {
    let cors = cors_layer(&state.config)?;

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route(
            DETECT_PATH,
            post(detect_bot)
                .options(preflight)
                .fallback(method_not_allowed),
        );

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    Ok(app
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
