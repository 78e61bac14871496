//! Link canonicalization for the crawl frontier.
//!
//! Every URL that enters the visited/queued sets goes through [`normalize`] or
//! [`normalize_url`], so two links addressing the same resource collapse to one
//! key: the fragment is dropped and exactly one trailing slash is removed.

use crate::error::{Result, ScanError};
use url::Url;

/// Pseudo-link prefixes that never point at a crawlable page.
const PSEUDO_LINK_PREFIXES: [&str; 4] = ["mailto:", "tel:", "javascript:", "data:"];

/// Returns false for hrefs that must never enter the frontier:
/// empty values, in-page fragments and mail/tel/script/data pseudo-links.
pub fn is_crawlable_href(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return false;
    }

    let lower = href.to_ascii_lowercase();
    !PSEUDO_LINK_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Resolve `href` against `base` and canonicalize the result.
///
/// Handles `..` segments, absolute paths and protocol-relative references.
/// Returns `None` when the base is not an absolute URL or the reference
/// cannot be joined.
pub fn normalize(href: &str, base: &str) -> Option<String> {
    let base_url = Url::parse(base).ok()?;
    let mut resolved = base_url.join(href.trim()).ok()?;
    resolved.set_fragment(None);
    Some(strip_trailing_slash(resolved.as_str()))
}

/// Canonicalize an absolute URL such as the crawl seed.
pub fn normalize_url(url: &str) -> Result<String> {
    let mut parsed = Url::parse(url.trim())
        .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;
    parsed.set_fragment(None);
    Ok(strip_trailing_slash(parsed.as_str()))
}

/// Path component of a URL without fragment and without the trailing slash.
/// Falls back to the raw input when it does not parse.
pub fn url_path(url: &str) -> String {
    Url::parse(url)
        .map(|u| strip_trailing_slash(u.path()))
        .unwrap_or_else(|_| url.to_string())
}

fn strip_trailing_slash(value: &str) -> String {
    value.strip_suffix('/').unwrap_or(value).to_string()
}
