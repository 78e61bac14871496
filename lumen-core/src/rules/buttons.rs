use super::page_title;
use crate::model::{ElementKind, Issue, IssueKind};
use lumen_scanner::Document;

pub fn check_buttons(url: &str, document: &Document) -> Vec<Issue> {
    let title = page_title(document);

    document
        .elements_by_tags(&["div", "span"])
        .filter(|el| el.has_attribute("onclick") || el.attribute("role") == Some("button"))
        .map(|el| {
            Issue::new(IssueKind::NonsemanticButton, ElementKind::Button, url, &title)
                .with_snippet(el.outer_html())
                .with_description(format!(
                    "<{}> used as a button; it is not keyboard focusable or announced as a button. Use <button> instead",
                    el.tag_name()
                ))
        })
        .collect()
}
