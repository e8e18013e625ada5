//! Request and response bodies of the HTTP API

use crate::config::CheckerConfig;
use crate::crawler::{BrokenLinkRecord, CheckOptions, CheckResult, CheckType};
use crate::output::CategorizedReport;
use crate::LinkScoutError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Shared state for the API handlers
#[derive(Clone)]
pub struct AppState {
    /// HTTP client shared by every check
    pub client: Client,

    /// Defaults that request options override
    pub defaults: Arc<CheckerConfig>,

    /// User agent sent when a request does not set one
    pub user_agent: Arc<str>,
}

/// Body of `POST /broken-links`
#[derive(Debug, Default, Deserialize)]
pub struct CheckRequest {
    pub url: Option<String>,

    #[serde(rename = "type")]
    pub check_type: Option<CheckType>,

    pub options: Option<RequestOptions>,
}

/// Per-request overrides of the configured defaults
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    pub max_pages: Option<usize>,

    /// Per-request timeout in milliseconds
    pub timeout: Option<u64>,

    pub max_retries: Option<u32>,
    pub user_agent: Option<String>,
    pub exclude_patterns: Option<Vec<String>>,
}

impl RequestOptions {
    /// Applies these overrides on top of `defaults`
    ///
    /// The result is not validated here; building a checker validates it.
    pub fn resolve(&self, defaults: &CheckerConfig) -> CheckOptions {
        let mut options = CheckOptions::from(defaults);
        if let Some(max_pages) = self.max_pages {
            options.max_pages = max_pages;
        }
        if let Some(timeout) = self.timeout {
            options.timeout = Duration::from_millis(timeout);
        }
        if let Some(max_retries) = self.max_retries {
            options.max_retries = max_retries;
        }
        if let Some(user_agent) = &self.user_agent {
            options.user_agent = Some(user_agent.clone());
        }
        if let Some(patterns) = &self.exclude_patterns {
            options.exclude_patterns = patterns.clone();
        }
        options
    }
}

/// Query string of `GET /broken-links`
#[derive(Debug, Deserialize)]
pub struct QuickCheckQuery {
    pub url: Option<String>,
}

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// `data` of a `POST /broken-links` response
#[derive(Debug, Serialize)]
pub struct CheckResponseData {
    #[serde(flatten)]
    pub result: CheckResult,
    pub categorized: CategorizedReport,
    pub metadata: CheckMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckMetadata {
    pub check_type: CheckType,
    pub timestamp: DateTime<Utc>,
    pub options: EffectiveOptions,
}

/// The options a check actually ran with
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveOptions {
    pub max_pages: usize,
    pub timeout: u64,
    pub max_retries: u32,
    pub user_agent: String,
    pub exclude_patterns: Vec<String>,
}

impl EffectiveOptions {
    pub fn new(options: &CheckOptions, default_user_agent: &str) -> Self {
        Self {
            max_pages: options.max_pages,
            timeout: u64::try_from(options.timeout.as_millis()).unwrap_or(u64::MAX),
            max_retries: options.max_retries,
            user_agent: options
                .user_agent
                .clone()
                .unwrap_or_else(|| default_user_agent.to_string()),
            exclude_patterns: options.exclude_patterns.clone(),
        }
    }
}

/// `data` of a `GET /broken-links` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickCheckData {
    pub url: String,
    pub is_broken: bool,
    pub result: Option<BrokenLinkRecord>,
    pub timestamp: DateTime<Utc>,
}

/// Error returned by the API handlers
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid input (400)
    BadRequest(String),

    /// Anything else (500)
    Internal { error: String, details: String },
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.as_str(), None),
            Self::Internal { error, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error.as_str(),
                Some(details.as_str()),
            ),
        };

        let body = Json(ErrorBody {
            success: false,
            error,
            details,
        });
        (status, body).into_response()
    }
}

impl From<LinkScoutError> for ApiError {
    fn from(error: LinkScoutError) -> Self {
        if error.is_input_error() {
            Self::BadRequest(error.to_string())
        } else {
            tracing::error!("Check failed: {}", error);
            Self::Internal {
                error: "Failed to check links".to_string(),
                details: error.to_string(),
            }
        }
    }
}
