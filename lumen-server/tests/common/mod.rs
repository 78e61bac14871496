// In-memory site and app wiring for the router tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use lumen_core::{Auditor, LogBuffer, RuleEngine, ScanController, ScanSettings};
use lumen_scanner::error::{Result, ScanError};
use lumen_scanner::{FetchedPage, PageFetcher};
use lumen_server::{AppState, router};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tower::ServiceExt;

pub struct FakeSite {
    pages: HashMap<String, String>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeSite {
    pub fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, html)| (url.to_string(), html.to_string()))
                .collect(),
            gate: None,
        }
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl PageFetcher for FakeSite {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        if let Some(ref gate) = self.gate {
            let _permit = gate.acquire().await.unwrap();
        }
        match self.pages.get(url) {
            Some(body) => Ok(FetchedPage {
                final_url: url.to_string(),
                status_code: 200,
                content_type: Some("text/html".to_string()),
                body: body.clone(),
                response_time: Duration::from_millis(1),
            }),
            None => Err(ScanError::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

pub fn sample_site() -> FakeSite {
    FakeSite::new(&[
        (
            "https://site.test",
            r#"<title>Home</title><a href="/about">About</a><img src="/logo.png">"#,
        ),
        ("https://site.test/about", "<title>About</title><h1>A</h1><h4>B</h4>"),
    ])
}

pub fn create_test_controller(site: FakeSite, reports_dir: &Path) -> ScanController {
    let settings = ScanSettings::default()
        .with_delay(Duration::ZERO)
        .with_reports_dir(&reports_dir.to_string_lossy());
    let auditor = Auditor::new(
        Arc::new(site),
        Arc::new(RuleEngine::standard()),
        Arc::new(LogBuffer::default()),
    )
    .with_settings(settings);
    ScanController::new(auditor)
}

pub fn create_test_app(controller: &ScanController) -> Router {
    router(AppState::new(controller.clone()))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Sends one request through a fresh clone of the router.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, bytes) = send_raw(app, request).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub async fn send_raw(
    app: &Router,
    request: Request<Body>,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, bytes.to_vec())
}
