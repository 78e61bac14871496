use crate::error::{Result, ScanError};
use crate::exclusion::ExclusionMatcher;
use crate::fetch::{FetchedPage, PageFetcher};
use crate::normalize::{is_crawlable_href, normalize, normalize_url};
use crate::result::{CrawlEvent, CrawlReport, Page};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub type EventCallback = Arc<dyn Fn(&CrawlEvent) + Send + Sync>;

pub const DEFAULT_MAX_DEPTH: usize = 2;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Visited/queued bookkeeping for one crawl.
///
/// A URL is in at most one of `visited` and `queued`; every frontier entry is
/// also in `queued`.
struct CrawlState {
    visited: HashSet<String>,
    queued: HashSet<String>,
    frontier: VecDeque<(String, usize)>,
}

impl CrawlState {
    fn seeded(seed: String) -> Self {
        let mut state = Self {
            visited: HashSet::new(),
            queued: HashSet::new(),
            frontier: VecDeque::new(),
        };
        state.enqueue(seed, 0);
        state
    }

    fn pop(&mut self) -> Option<(String, usize)> {
        let (url, depth) = self.frontier.pop_front()?;
        self.queued.remove(&url);
        Some((url, depth))
    }

    /// Returns false if the URL was already visited.
    fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    fn enqueue(&mut self, url: String, depth: usize) -> bool {
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.frontier.push_back((url, depth));
        true
    }

    fn known(&self) -> usize {
        self.visited.len() + self.queued.len()
    }
}

/// Sequential breadth-first crawler that stays under one base URL.
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    max_depth: usize,
    exclusions: ExclusionMatcher,
    delay: Duration,
    fetch_timeout: Duration,
    max_pages: Option<usize>,
    event_callback: Option<EventCallback>,
    cancel: CancellationToken,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            max_depth: DEFAULT_MAX_DEPTH,
            exclusions: ExclusionMatcher::default(),
            delay: DEFAULT_DELAY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_pages: None,
            event_callback: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionMatcher) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Politeness delay between two fetches.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Caps the number of URLs the crawl will ever know about (visited plus queued).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    /// Once the token is cancelled the crawl stops taking work from the
    /// frontier. A fetch already in flight still completes.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub async fn crawl(&self, base_url: &str) -> Result<CrawlReport> {
        let base = normalize_url(base_url)?;
        info!("Starting crawl of {} (max depth {})", base, self.max_depth);

        let started = Instant::now();
        let mut state = CrawlState::seeded(base.clone());
        let mut report = CrawlReport::default();

        while let Some((url, depth)) = state.pop() {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                self.emit(CrawlEvent::Cancelled {
                    remaining: state.frontier.len() + 1,
                });
                break;
            }

            if !state.mark_visited(&url) {
                debug!("Already visited {}", url);
                continue;
            }

            if depth > self.max_depth {
                self.emit(CrawlEvent::DepthExceeded {
                    url: url.clone(),
                    depth,
                });
                report.depth_skipped.push(url);
                continue;
            }

            if let Some(pattern) = self.exclusions.matches_url(&url) {
                self.emit(CrawlEvent::Excluded {
                    url: url.clone(),
                    pattern: pattern.to_string(),
                });
                report.excluded.push((url, pattern.to_string()));
                continue;
            }

            self.emit(CrawlEvent::Fetching {
                url: url.clone(),
                depth,
            });

            match self.fetch(&url).await {
                Ok(fetched) => {
                    let mut page = Page::new(url.clone(), depth, fetched);

                    if depth < self.max_depth && page.is_html() {
                        for link in same_site_links(&page, &base) {
                            if self.max_pages.is_some_and(|max| state.known() >= max) {
                                debug!("Page ceiling reached, not queuing {}", link);
                                break;
                            }
                            if state.enqueue(link.clone(), depth + 1) {
                                page.links_found.push(link);
                            }
                        }
                    }

                    self.emit(CrawlEvent::Fetched {
                        url,
                        links: page.links_found.len(),
                    });
                    report.pages.push(page);
                }
                Err(e) => {
                    warn!("Crawl error for {}: {}", url, e);
                    self.emit(CrawlEvent::FetchFailed {
                        url: url.clone(),
                        error: e.to_string(),
                    });
                    report.failed.push((url, e.to_string()));
                }
            }

            if !state.frontier.is_empty() && !self.delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.delay) => {}
                    _ = self.cancel.cancelled() => {}
                }
            }
        }

        self.emit(CrawlEvent::Finished {
            pages: report.pages.len(),
            elapsed: started.elapsed(),
        });
        info!(
            "Crawl complete. Visited {} URLs, {} pages fetched",
            state.visited.len(),
            report.pages.len()
        );

        Ok(report)
    }

    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(url))
            .await
            .map_err(|_| ScanError::Timeout(url.to_string()))?
    }

    fn emit(&self, event: CrawlEvent) {
        debug!("{}", event);
        if let Some(ref callback) = self.event_callback {
            callback(&event);
        }
    }
}

/// Normalized links on `page` that share the literal `base` prefix.
///
/// This is a string prefix test, not a host comparison: with base
/// `https://example.com`, `https://example.com.other.net/` also passes.
fn same_site_links(page: &Page, base: &str) -> Vec<String> {
    let document = page.document();
    document
        .anchor_hrefs()
        .iter()
        .filter(|href| is_crawlable_href(href))
        .filter_map(|href| normalize(href, &page.final_url))
        .filter(|link| link.starts_with(base))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    /// In-memory site keyed by normalized URL; records every fetch.
    struct FakeSite {
        pages: HashMap<String, String>,
        fetches: Mutex<Vec<String>>,
    }

    impl FakeSite {
        fn new(pages: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                pages: pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
                fetches: Mutex::new(Vec::new()),
            })
        }

        fn fetched(&self) -> Vec<String> {
            self.fetches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for FakeSite {
        async fn fetch(&self, url: &str) -> Result<FetchedPage> {
            self.fetches.lock().unwrap().push(url.to_string());
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

    fn crawler(site: Arc<FakeSite>) -> Crawler {
        Crawler::new(site).with_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_link_discovery() {
        let mock_server = MockServer::start().await;

        let root_html = format!(
            r#"<html><body>
                <a href="{}/page1">Page 1</a>
                <a href="/page2">Page 2</a>
                <a href="mailto:hello@example.com">Mail</a>
            </body></html>"#,
            mock_server.uri()
        );

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(root_html.as_bytes()),
            )
            .mount(&mock_server)
            .await;

        for page in ["/page1", "/page2"] {
            Mock::given(method("GET"))
                .and(path(page))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header("content-type", "text/html")
                        .set_body_bytes(b"<html><body>Leaf</body></html>"),
                )
                .mount(&mock_server)
                .await;
        }

        let fetcher = Arc::new(crate::fetch::HttpFetcher::new().unwrap());
        let crawler = Crawler::new(fetcher)
            .with_max_depth(2)
            .with_delay(Duration::ZERO);

        let report = crawler.crawl(&mock_server.uri()).await.unwrap();

        assert_eq!(report.pages.len(), 3, "root + 2 links: {:?}", report.page_urls());
        assert_eq!(report.pages[0].url, mock_server.uri());
        assert_eq!(report.pages[0].links_found.len(), 2);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_excluded_page_is_never_fetched() {
        let mock_server = MockServer::start().await;
        let pages = [
            ("/", r#"<a href="/b">B</a>"#),
            ("/b", r#"<a href="/c">C</a>"#),
            ("/c", "<p>C</p>"),
        ];
        for (route, body) in pages {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header("content-type", "text/html")
                        .set_body_string(format!("<html><body>{}</body></html>", body)),
                )
                .mount(&mock_server)
                .await;
        }

        let fetcher = Arc::new(crate::fetch::HttpFetcher::new().unwrap());
        let crawler = Crawler::new(fetcher)
            .with_max_depth(2)
            .with_delay(Duration::ZERO)
            .with_exclusions(ExclusionMatcher::new(&["/c*"]).unwrap());

        let report = crawler.crawl(&mock_server.uri()).await.unwrap();

        let base = mock_server.uri();
        assert_eq!(
            report.page_urls(),
            vec![base.clone(), format!("{}/b", base)]
        );
        assert_eq!(
            report.excluded,
            vec![(format!("{}/c", base), "/c*".to_string())]
        );
    }

    #[tokio::test]
    async fn test_cycles_are_visited_once() {
        let site = FakeSite::new(&[
            ("https://site.test", r#"<a href="/a">A</a><a href="/a/">A again</a>"#),
            (
                "https://site.test/a",
                r#"<a href="/">Home</a><a href="/a#top">Self</a><a href="b">B</a>"#,
            ),
            ("https://site.test/b", r#"<a href="/a">A</a><a href="/">Home</a>"#),
        ]);

        let report = crawler(site.clone())
            .with_max_depth(5)
            .crawl("https://site.test/")
            .await
            .unwrap();

        assert_eq!(
            site.fetched(),
            vec![
                "https://site.test".to_string(),
                "https://site.test/a".to_string(),
                "https://site.test/b".to_string(),
            ]
        );
        assert_eq!(report.pages.len(), 3);
    }

    #[tokio::test]
    async fn test_depth_limit_is_respected() {
        let site = FakeSite::new(&[
            ("https://site.test", r#"<a href="/one">1</a>"#),
            ("https://site.test/one", r#"<a href="/two">2</a>"#),
            ("https://site.test/two", r#"<a href="/three">3</a>"#),
        ]);

        let report = crawler(site.clone())
            .with_max_depth(1)
            .crawl("https://site.test")
            .await
            .unwrap();

        assert_eq!(
            report.page_urls(),
            vec!["https://site.test", "https://site.test/one"]
        );
        assert!(report.pages.iter().all(|page| page.depth <= 1));
        assert!(!site.fetched().contains(&"https://site.test/two".to_string()));
    }

    #[tokio::test]
    async fn test_depth_zero_audits_only_the_seed() {
        let site = FakeSite::new(&[("https://site.test", r#"<a href="/one">1</a>"#)]);

        let report = crawler(site.clone())
            .with_max_depth(0)
            .crawl("https://site.test")
            .await
            .unwrap();

        assert_eq!(report.pages.len(), 1);
        assert!(report.pages[0].links_found.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failures_do_not_stop_the_crawl() {
        let site = FakeSite::new(&[
            (
                "https://site.test",
                r#"<a href="/gone">Gone</a><a href="/here">Here</a>"#,
            ),
            ("https://site.test/here", "<p>ok</p>"),
        ]);

        let report = crawler(site)
            .crawl("https://site.test")
            .await
            .unwrap();

        assert_eq!(
            report.page_urls(),
            vec!["https://site.test", "https://site.test/here"]
        );
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "https://site.test/gone");
    }

    #[tokio::test]
    async fn test_prefix_same_site_rule() {
        let site = FakeSite::new(&[(
            "https://site.test/docs",
            r#"<a href="https://site.test/docs/intro">in</a>
               <a href="https://site.test/blog">out</a>
               <a href="https://other.test/docs">elsewhere</a>"#,
        )]);

        let report = crawler(site)
            .crawl("https://site.test/docs/")
            .await
            .unwrap();

        assert_eq!(
            report.pages[0].links_found,
            vec!["https://site.test/docs/intro".to_string()]
        );
    }

    #[tokio::test]
    async fn test_max_pages_caps_the_frontier() {
        let site = FakeSite::new(&[(
            "https://site.test",
            r#"<a href="/1">1</a><a href="/2">2</a><a href="/3">3</a><a href="/4">4</a>"#,
        )]);

        let report = crawler(site.clone())
            .with_max_pages(3)
            .crawl("https://site.test")
            .await
            .unwrap();

        assert_eq!(report.pages[0].links_found.len(), 2);
        assert_eq!(site.fetched().len(), 3);
    }

    #[tokio::test]
    async fn test_cancellation_stops_enqueued_work() {
        let site = FakeSite::new(&[
            ("https://site.test", r#"<a href="/1">1</a><a href="/2">2</a>"#),
            ("https://site.test/1", "<p>1</p>"),
            ("https://site.test/2", "<p>2</p>"),
        ]);

        let token = CancellationToken::new();
        let trip = token.clone();
        let report = crawler(site.clone())
            .with_cancellation(token)
            .with_event_callback(Arc::new(move |event| {
                if matches!(event, CrawlEvent::Fetched { .. }) {
                    trip.cancel();
                }
            }))
            .crawl("https://site.test")
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.page_urls(), vec!["https://site.test"]);
        assert_eq!(site.fetched().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_base_url() {
        let site = FakeSite::new(&[]);
        let err = crawler(site).crawl("no scheme here").await.unwrap_err();
        assert!(matches!(err, ScanError::InvalidUrl(_)));
    }
}
