use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures of the translation pipeline
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Unsupported language pair: {from} -> {to}")]
    UnsupportedLanguagePair { from: String, to: String },

    #[error("Pinyin lookup failed for '{text}': {message}")]
    PinyinLookupFailed { text: String, message: String },

    #[error("Translation failed for '{text}': {message}")]
    TranslationFailed { text: String, message: String },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Failed to mask translation result: {message}")]
    ResultMaskingFailed {
        message: String,
        data: serde_json::Value,
    },
}

impl TranslateError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedLanguagePair { .. } => StatusCode::BAD_REQUEST,
            Self::TranslationFailed { .. } | Self::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            Self::PinyinLookupFailed { .. } | Self::ResultMaskingFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error body returned by every handler: `{"success": false, "message": ..}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Full error chain, only sent outside production
    pub stack: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            stack: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("Not Found - {}", path))
    }

    /// Wrap a translation failure; `expose_stack` is false in production
    pub fn from_translate(err: TranslateError, expose_stack: bool) -> Self {
        let stack = match &err {
            TranslateError::ResultMaskingFailed { data, .. } => {
                format!("{:?}\ndata: {}", err, data)
            }
            _ => format!("{:?}", err),
        };
        Self {
            status: err.status_code(),
            message: err.to_string(),
            stack: expose_stack.then_some(stack),
        }
    }

    /// Wrap an upstream failure (proxying, provider plumbing) as a 502
    pub fn upstream(err: anyhow::Error, expose_stack: bool) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: format!("{:#}", err),
            stack: expose_stack.then(|| format!("{:?}", err)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{} - {}", self.status, self.message);
        }

        let mut body = json!({
            "success": false,
            "message": self.message,
        });
        if let Some(stack) = self.stack {
            body["stack"] = json!(stack);
        }

        (self.status, Json(body)).into_response()
    }
}
