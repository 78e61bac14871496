use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use lumen_core::{ReportFormat, ScanRequest, audit_markup};
use lumen_scanner::PageFetcher;
use lumen_scanner::normalize::normalize_url;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

const INLINE_SOURCE_URL: &str = "about:blank";

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

pub async fn start_scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let request = body(payload)?;
    let job_id = state.controller.start(request)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "status": "started", "job_id": job_id })),
    ))
}

pub async fn scan_status(State(state): State<AppState>) -> Json<Value> {
    let job = state.controller.status();
    Json(json!({
        "running": state.controller.is_running(),
        "status": state.controller.job_status().as_str(),
        "target": job.as_ref().map(|job| job.target.clone()),
        "job_id": job.as_ref().map(|job| job.id),
        "error": job.as_ref().and_then(|job| job.error.clone()),
        "pages_scanned": job.as_ref().map(|job| job.pages_scanned).unwrap_or(0),
        "issues_found": job.as_ref().map(|job| job.issues_found).unwrap_or(0),
    }))
}

pub async fn scan_result(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let issues = state
        .controller
        .result()
        .ok_or_else(|| ApiError::NotFound("No scan result available".to_string()))?;
    Ok(Json(json!({ "issues": issues.as_slice() })))
}

pub async fn cancel_scan(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.controller.cancel()?;
    Ok(Json(json!({ "status": "cancelling" })))
}

async fn download(state: AppState, format: ReportFormat) -> ApiResult<impl IntoResponse> {
    let controller = state.controller.clone();
    let saved = tokio::task::spawn_blocking(move || controller.export(format))
        .await
        .map_err(|e| ApiError::Internal(format!("Report task failed: {}", e)))??;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", saved.filename),
            ),
        ],
        saved.content,
    ))
}

pub async fn download_csv(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    download(state, ReportFormat::Csv).await
}

pub async fn download_html(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    download(state, ReportFormat::Html).await
}

pub async fn log_buffer(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "logs": state.controller.log().snapshot() }))
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub css: Option<String>,
}

/// Audits a single document without touching the scan job. Inline `html`
/// wins over `url`; the URL is then only used to label the issues.
pub async fn check(
    State(state): State<AppState>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let request = body(payload)?;
    let auditor = state.controller.auditor();

    let (source, url, markup) = match (request.html, request.url) {
        (Some(html), url) => (
            "html",
            url.unwrap_or_else(|| INLINE_SOURCE_URL.to_string()),
            html,
        ),
        (None, Some(url)) => {
            let url = normalize_url(&url).map_err(|e| ApiError::BadRequest(e.to_string()))?;
            debug!("Fetching {} for a single-page check", url);
            let fetched = tokio::time::timeout(
                auditor.settings().fetch_timeout,
                auditor.fetcher().fetch(&url),
            )
            .await
            .map_err(|_| ApiError::BadGateway(format!("Timed out fetching {}", url)))?
            .map_err(|e| {
                warn!("Check fetch failed for {}: {}", url, e);
                ApiError::BadGateway(format!("Could not fetch {}", url))
            })?;
            ("url", fetched.final_url, fetched.body)
        }
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Either url or html is required".to_string(),
            ));
        }
    };

    let issues = audit_markup(auditor.engine(), &url, &markup, request.css.as_deref());
    Ok(Json(json!({ "source": source, "url": url, "issues": issues })))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
