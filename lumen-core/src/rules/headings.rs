use super::page_title;
use crate::model::{ElementKind, Issue, IssueKind};
use lumen_scanner::Document;

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Flags every heading more than one level deeper than the heading before it.
/// Going back up any number of levels is fine.
pub fn check_headings(url: &str, document: &Document) -> Vec<Issue> {
    let title = page_title(document);

    let headings: Vec<_> = document
        .elements_by_tags(&HEADING_TAGS)
        .filter_map(|h| Some((heading_level(h.tag_name())?, h)))
        .collect();

    headings
        .windows(2)
        .filter(|pair| pair[1].0 > pair[0].0 + 1)
        .map(|pair| {
            let (previous, _) = pair[0];
            let (level, heading) = pair[1];
            Issue::new(IssueKind::HeadingHierarchyError, ElementKind::Heading, url, &title)
                .with_snippet(heading.outer_html())
                .with_description(format!(
                    "Heading level skipped: h{} follows h{}",
                    level, previous
                ))
        })
        .collect()
}

fn heading_level(tag: &str) -> Option<u8> {
    let digit = tag.strip_prefix('h')?;
    match digit.parse::<u8>() {
        Ok(level @ 1..=6) => Some(level),
        _ => None,
    }
}
