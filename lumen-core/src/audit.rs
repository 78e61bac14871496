// Crawl-then-audit pipeline shared by background jobs and the CLI

use crate::config::ScanSettings;
use crate::dedupe::dedupe;
use crate::logbuffer::LogBuffer;
use crate::model::{Issue, UNTITLED_PAGE};
use crate::rules::RuleEngine;
use lumen_scanner::crawler::DEFAULT_MAX_DEPTH;
use lumen_scanner::error::Result;
use lumen_scanner::{
    CancellationToken, CrawlEvent, CrawlReport, Crawler, Document, EventCallback,
    ExclusionMatcher, Page, PageFetcher,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// What to scan. This is also the JSON body of `POST /scan/start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub url: String,
    #[serde(default)]
    pub exclude: Vec<String>,
    /// `false` audits only the entered URL.
    #[serde(default = "default_full")]
    pub full: bool,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_full() -> bool {
    true
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl ScanRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            exclude: Vec::new(),
            full: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude = patterns;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn single_page(mut self) -> Self {
        self.full = false;
        self
    }

    /// Depth the crawler actually uses.
    pub fn crawl_depth(&self) -> usize {
        if self.full { self.max_depth } else { 0 }
    }
}

#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub issues: Vec<Issue>,
    pub crawl: CrawlReport,
}

impl AuditOutcome {
    pub fn pages_scanned(&self) -> usize {
        self.crawl.pages.len()
    }

    /// Issue count per kind, for summaries.
    pub fn counts_by_kind(&self) -> BTreeMap<&'static str, usize> {
        count_by_kind(&self.issues)
    }
}

pub fn count_by_kind(issues: &[Issue]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for issue in issues {
        *counts.entry(issue.kind.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Crawls a site and runs the rule engine over every fetched page.
#[derive(Clone)]
pub struct Auditor {
    fetcher: Arc<dyn PageFetcher>,
    engine: Arc<RuleEngine>,
    log: Arc<LogBuffer>,
    settings: ScanSettings,
    event_callback: Option<EventCallback>,
}

impl Auditor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, engine: Arc<RuleEngine>, log: Arc<LogBuffer>) -> Self {
        Self {
            fetcher,
            engine,
            log,
            settings: ScanSettings::default(),
            event_callback: None,
        }
    }

    pub fn with_settings(mut self, settings: ScanSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Extra observer for crawl events, on top of the log buffer.
    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    pub fn fetcher(&self) -> &Arc<dyn PageFetcher> {
        &self.fetcher
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn log(&self) -> &Arc<LogBuffer> {
        &self.log
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    pub async fn run(&self, request: &ScanRequest, cancel: CancellationToken) -> Result<AuditOutcome> {
        let exclusions = ExclusionMatcher::new(&request.exclude)?;

        self.log.push(format!("[scan] started: {}", request.url));
        self.log.push(format!("[scan] crawl depth: {}", request.crawl_depth()));
        if !exclusions.is_empty() {
            self.log
                .push(format!("[scan] excluding: {}", request.exclude.join(", ")));
        }
        if !request.full {
            self.log.push("[scan] single page mode: only the entered URL is audited");
        }

        let crawl = self.crawler(request, exclusions, cancel).crawl(&request.url).await?;
        self.log
            .push(format!("[crawler] {} pages collected", crawl.pages.len()));
        if crawl.cancelled {
            self.log.push("[scan] cancelled, auditing the pages fetched so far");
        }

        let mut issues = Vec::new();
        for page in &crawl.pages {
            issues.extend(self.audit_page(page));
        }
        let issues = dedupe(issues);

        self.log
            .push(format!("[scan] complete: {} issues found", issues.len()));

        Ok(AuditOutcome { issues, crawl })
    }

    fn crawler(
        &self,
        request: &ScanRequest,
        exclusions: ExclusionMatcher,
        cancel: CancellationToken,
    ) -> Crawler {
        let log = Arc::clone(&self.log);
        let observer = self.event_callback.clone();
        let callback: EventCallback = Arc::new(move |event: &CrawlEvent| {
            // per-fetch chatter stays in tracing only
            if !matches!(event, CrawlEvent::Fetching { .. }) {
                log.push(event.to_string());
            }
            if let Some(ref observer) = observer {
                observer(event);
            }
        });

        let mut crawler = Crawler::new(Arc::clone(&self.fetcher))
            .with_max_depth(request.crawl_depth())
            .with_exclusions(exclusions)
            .with_delay(self.settings.delay)
            .with_fetch_timeout(self.settings.fetch_timeout)
            .with_event_callback(callback)
            .with_cancellation(cancel);
        if let Some(max_pages) = self.settings.max_pages {
            crawler = crawler.with_max_pages(max_pages);
        }
        crawler
    }

    /// Parses the page and runs every check; the parsed tree never outlives
    /// this call.
    fn audit_page(&self, page: &Page) -> Vec<Issue> {
        self.log.push(format!("[audit] checking {}", page.url));
        let document = page.document();
        let issues = self.engine.run_with(&page.url, &document, |label, found| {
            self.log.push(format!("  -> {}: {} found", label, found));
        });
        self.log.push(format!("[audit] done with {}", page.url));
        issues
    }
}

/// Audits one document without crawling. `css` is checked as an extra
/// stylesheet on top of the `<style>` blocks inside `html`.
pub fn audit_markup(engine: &RuleEngine, url: &str, html: &str, css: Option<&str>) -> Vec<Issue> {
    let document = Document::parse(html);
    let mut issues = engine.run(url, &document);
    if let Some(css) = css {
        let title = document
            .title()
            .unwrap_or_else(|| UNTITLED_PAGE.to_string());
        issues.extend(engine.check_css(url, &title, css));
    }
    dedupe(issues)
}
