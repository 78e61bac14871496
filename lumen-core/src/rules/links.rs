use super::page_title;
use crate::model::{ElementKind, Issue, IssueKind};
use lumen_scanner::Document;

/// Anchors without a usable `href` (absent or blank) or without visible text.
pub fn check_links(url: &str, document: &Document) -> Vec<Issue> {
    let title = page_title(document);

    document
        .elements_by_tag("a")
        .filter(|a| {
            a.attribute("href").is_none_or(|href| href.trim().is_empty()) || !a.has_visible_text()
        })
        .map(|a| {
            Issue::new(IssueKind::LinkIncomplete, ElementKind::Link, url, &title)
                .with_snippet(a.outer_html())
                .with_description("Link missing href or text")
        })
        .collect()
}
