use crate::logbuffer::DEFAULT_LOG_CAPACITY;
use lumen_scanner::fetch::DEFAULT_USER_AGENT;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_REPORTS_DIR: &str = "reports";

/// Knobs shared by background jobs and foreground CLI scans.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub fetch_timeout: Duration,
    /// Politeness delay between two fetches.
    pub delay: Duration,
    /// Ceiling on the number of URLs one crawl will queue. `None` means the
    /// crawl is bounded by depth alone.
    pub max_pages: Option<usize>,
    pub log_capacity: usize,
    pub reports_dir: PathBuf,
    pub user_agent: String,
    /// Also run the role, `<h1>`, iframe title and `lang` checks.
    pub structure_checks: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(5),
            delay: Duration::from_millis(100),
            max_pages: None,
            log_capacity: DEFAULT_LOG_CAPACITY,
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            structure_checks: false,
        }
    }
}

impl ScanSettings {
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_structure_checks(mut self, enabled: bool) -> Self {
        self.structure_checks = enabled;
        self
    }

    /// Accepts `~` and `$VAR` in the path.
    pub fn with_reports_dir(mut self, dir: &str) -> Self {
        let expanded = shellexpand::full(dir)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| dir.to_string());
        self.reports_dir = PathBuf::from(expanded);
        self
    }
}
