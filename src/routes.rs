use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{header, HeaderMap, HeaderValue},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::middleware::{check_origin, cors_layer, not_found, with_security_headers, with_tracing};
use crate::proxy::ProxyBody;
use crate::state::AppState;
use crate::translate::{DecodeMode, LanguageCode, TranslateOutcome, TranslationQuery};

/// Full application: routes plus middleware, state applied
pub fn create_app(state: AppState) -> Router {
    let router = create_routes()
        .layer(axum_middleware::from_fn_with_state(state.clone(), check_origin))
        .layer(cors_layer(&state.config.server_config));

    with_tracing(with_security_headers(router)).with_state(state)
}

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(welcome))
        .route("/api", get(api_root))
        .route("/api/", get(api_root))
        .route("/api/health", get(health_check))
        .route("/api/translate", get(translate))
        .route("/api/proxy/*url", get(proxy))
        .fallback(not_found)
}

async fn welcome() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the Chinese Scraper's Backend 👋"
    }))
}

async fn api_root() -> Json<Value> {
    Json(json!({ "message": "API" }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
struct TranslateParams {
    text: Option<String>,
    from: Option<String>,
    to: Option<String>,
    #[serde(default)]
    extended: bool,
    #[serde(default)]
    raw: bool,
    mode: Option<DecodeMode>,
}

impl TranslateParams {
    fn into_query(self) -> Result<TranslationQuery, ApiError> {
        let text = self
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("Query parameter 'text' is required"))?;

        Ok(TranslationQuery {
            text,
            from: self.from.map(LanguageCode::new).unwrap_or_else(LanguageCode::chinese),
            to: self.to.map(LanguageCode::new).unwrap_or_else(LanguageCode::english),
            extended: self.extended,
            raw: self.raw,
            mode: self.mode,
        })
    }
}

async fn translate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<TranslateParams>,
) -> Result<Json<TranslateOutcome>, ApiError> {
    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    info!("[referer: {}] - Query: {:?}", referer, params);

    let query = params.into_query()?;
    let outcome = state
        .translator
        .translate(&query)
        .await
        .map_err(|e| ApiError::from_translate(e, state.expose_error_stack()))?;

    Ok(Json(outcome))
}

async fn proxy(
    State(state): State<AppState>,
    Path(url): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let target = match query {
        Some(q) if !q.is_empty() => format!("{}?{}", url, q),
        _ => url,
    };

    let body = state
        .proxy
        .fetch(&target)
        .await
        .map_err(|e| ApiError::upstream(e.context("Failed to proxy"), state.expose_error_stack()))?;

    Ok(match body {
        ProxyBody::Json(value) => Json(value).into_response(),
        ProxyBody::Text { content_type, body } => {
            let content_type = HeaderValue::from_str(&content_type)
                .unwrap_or_else(|_| HeaderValue::from_static("text/plain; charset=utf-8"));
            ([(header::CONTENT_TYPE, content_type)], body).into_response()
        }
    })
}
