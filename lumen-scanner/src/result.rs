use crate::document::Document;
use crate::fetch::FetchedPage;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A page the crawler fetched successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Normalized frontier key.
    pub url: String,
    pub final_url: String,
    pub depth: usize,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub response_time: Duration,
    pub links_found: Vec<String>,
    #[serde(skip)]
    pub markup: String,
}

impl Page {
    pub fn new(url: String, depth: usize, fetched: FetchedPage) -> Self {
        Self {
            url,
            final_url: fetched.final_url,
            depth,
            status_code: fetched.status_code,
            content_type: fetched.content_type,
            response_time: fetched.response_time,
            links_found: Vec::new(),
            markup: fetched.body,
        }
    }

    /// Pages without a content type are assumed to be HTML.
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.contains("html"))
            .unwrap_or(true)
    }

    /// Parses the stored markup. The parsed tree is not `Send`, so callers
    /// parse where they audit instead of carrying it across await points.
    pub fn document(&self) -> Document {
        Document::parse(&self.markup)
    }
}

/// Outcome of one crawl invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlReport {
    pub pages: Vec<Page>,
    /// `(url, pattern)` for every URL an exclusion rule skipped.
    pub excluded: Vec<(String, String)>,
    /// `(url, error)` for every fetch that failed.
    pub failed: Vec<(String, String)>,
    pub depth_skipped: Vec<String>,
    pub cancelled: bool,
}

impl CrawlReport {
    pub fn page_urls(&self) -> Vec<&str> {
        self.pages.iter().map(|page| page.url.as_str()).collect()
    }
}

/// Progress notifications emitted while crawling.
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    Fetching { url: String, depth: usize },
    Fetched { url: String, links: usize },
    DepthExceeded { url: String, depth: usize },
    Excluded { url: String, pattern: String },
    FetchFailed { url: String, error: String },
    Cancelled { remaining: usize },
    Finished { pages: usize, elapsed: Duration },
}

impl std::fmt::Display for CrawlEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrawlEvent::Fetching { url, depth } => write!(f, "[crawler] fetching {} (depth {})", url, depth),
            CrawlEvent::Fetched { url, links } => write!(f, "[crawler] found {} ({} new links)", url, links),
            CrawlEvent::DepthExceeded { url, depth } => {
                write!(f, "[crawler] depth {} exceeds limit, skipping {}", depth, url)
            }
            CrawlEvent::Excluded { url, pattern } => {
                write!(f, "[crawler] excluded {} (pattern {})", url, pattern)
            }
            CrawlEvent::FetchFailed { url, error } => write!(f, "[crawler] failed {}: {}", url, error),
            CrawlEvent::Cancelled { remaining } => {
                write!(f, "[crawler] cancelled with {} URLs left in the frontier", remaining)
            }
            CrawlEvent::Finished { pages, elapsed } => write!(
                f,
                "[crawler] finished: {} pages in {:.2}s",
                pages,
                elapsed.as_secs_f64()
            ),
        }
    }
}
