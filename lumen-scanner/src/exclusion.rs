//! Shell-style exclusion rules matched against URL paths.

use crate::error::Result;
use crate::normalize::url_path;
use globset::{Glob, GlobMatcher};

/// Compiled set of exclusion globs (`*`, `?`, `[...]`).
///
/// `*` also crosses `/`, so `/blog*` excludes `/blog/2024/post` as well.
#[derive(Debug, Clone, Default)]
pub struct ExclusionMatcher {
    patterns: Vec<(String, GlobMatcher)>,
}

impl ExclusionMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            compiled.push((pattern.to_string(), Glob::new(pattern)?.compile_matcher()));
        }
        Ok(Self { patterns: compiled })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns the first pattern matching `path`.
    ///
    /// The path is tested with its trailing slash stripped and again with a
    /// slash appended, so `/docs` and `/docs/` behave the same for every rule.
    pub fn matches(&self, path: &str) -> Option<&str> {
        let path = path.split('#').next().unwrap_or(path);
        let bare = path.strip_suffix('/').unwrap_or(path);
        let slashed = format!("{}/", bare);

        self.patterns
            .iter()
            .find(|(_, matcher)| matcher.is_match(bare) || matcher.is_match(&slashed))
            .map(|(pattern, _)| pattern.as_str())
    }

    /// Like [`ExclusionMatcher::matches`] but takes a full URL and only looks at its path.
    pub fn matches_url(&self, url: &str) -> Option<&str> {
        self.matches(&url_path(url))
    }
}

/// One-shot form of [`ExclusionMatcher::matches`]. Patterns that fail to
/// compile never match.
pub fn matches<S: AsRef<str>>(path: &str, patterns: &[S]) -> Option<String> {
    patterns.iter().find_map(|pattern| {
        let matcher = ExclusionMatcher::new(std::slice::from_ref(pattern)).ok()?;
        matcher.matches(path).map(str::to_string)
    })
}
