// In-memory site used by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use lumen_core::{Auditor, LogBuffer, RuleEngine, ScanSettings};
use lumen_scanner::error::{Result, ScanError};
use lumen_scanner::{FetchedPage, PageFetcher};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Serves fixed markup per URL. URLs listed in `panics_on` make the fetch
/// panic; an optional gate holds every fetch until the test opens it.
pub struct FakeSite {
    pages: HashMap<String, String>,
    panics_on: Vec<String>,
    gate: Option<Arc<Semaphore>>,
    fetched: Mutex<Vec<String>>,
}

impl FakeSite {
    pub fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, html)| (url.to_string(), html.to_string()))
                .collect(),
            panics_on: Vec::new(),
            gate: None,
            fetched: Mutex::new(Vec::new()),
        }
    }

    pub fn panicking_on(mut self, url: &str) -> Self {
        self.panics_on.push(url.to_string());
        self
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeSite {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        if let Some(ref gate) = self.gate {
            let _permit = gate.acquire().await.unwrap();
        }
        self.fetched.lock().unwrap().push(url.to_string());
        if self.panics_on.iter().any(|u| u == url) {
            panic!("fetcher exploded on {}", url);
        }
        match self.pages.get(url) {
            Some(body) => Ok(FetchedPage {
                final_url: url.to_string(),
                status_code: 200,
                content_type: Some("text/html; charset=utf-8".to_string()),
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

pub fn fast_settings() -> ScanSettings {
    ScanSettings::default().with_delay(Duration::ZERO)
}

pub fn auditor(site: Arc<FakeSite>) -> Auditor {
    Auditor::new(site, Arc::new(RuleEngine::standard()), Arc::new(LogBuffer::default()))
        .with_settings(fast_settings())
}
