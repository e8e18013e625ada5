//! Handlers for the `/broken-links` endpoints

use crate::crawler::{CheckOptions, LinkChecker};
use crate::output::categorize;
use crate::server::types::{
    ApiError, ApiResponse, AppState, CheckMetadata, CheckRequest, CheckResponseData,
    EffectiveOptions, QuickCheckData, QuickCheckQuery,
};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

/// `POST /broken-links`: page, site or single-URL check
pub async fn check_links_handler(
    State(state): State<AppState>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CheckResponseData>>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let url = required_url(request.url.as_deref())?;

    let check_type = request.check_type.unwrap_or_default();
    let options = request
        .options
        .unwrap_or_default()
        .resolve(&state.defaults);
    let checker = LinkChecker::with_client(state.client.clone(), options)?;

    tracing::info!("POST /broken-links {} ({})", url, check_type.as_str());
    let result = checker.run(check_type, url).await?;

    let categorized = categorize(&result.broken_links);
    let metadata = CheckMetadata {
        check_type,
        timestamp: Utc::now(),
        options: EffectiveOptions::new(checker.options(), &state.user_agent),
    };

    Ok(Json(ApiResponse::ok(CheckResponseData {
        result,
        categorized,
        metadata,
    })))
}

/// `GET /broken-links?url=...`: quick single-URL liveness check
pub async fn quick_check_handler(
    State(state): State<AppState>,
    query: Result<Query<QuickCheckQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<QuickCheckData>>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let url = required_url(query.url.as_deref())?;

    let options = CheckOptions::from(state.defaults.as_ref());
    let checker = LinkChecker::with_client(state.client.clone(), options)?;

    tracing::info!("GET /broken-links {}", url);
    let result = checker.check_single_url(url).await?;

    Ok(Json(ApiResponse::ok(QuickCheckData {
        url: url.to_string(),
        is_broken: result.is_some(),
        result,
        timestamp: Utc::now(),
    })))
}

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

fn required_url(url: Option<&str>) -> Result<&str, ApiError> {
    url.map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::BadRequest("url is required".to_string()))
}
