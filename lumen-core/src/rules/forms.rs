use super::page_title;
use crate::model::{ElementKind, Issue, IssueKind};
use lumen_scanner::Document;
use std::collections::HashSet;

/// Form controls whose `id` no `<label for>` points at.
pub fn check_form_labels(url: &str, document: &Document) -> Vec<Issue> {
    let title = page_title(document);

    let labelled: HashSet<&str> = document
        .elements_by_tag("label")
        .filter_map(|label| label.attribute("for"))
        .map(str::trim)
        .collect();

    document
        .elements_by_tags(&["input", "select", "textarea"])
        .filter(|control| {
            !control
                .attribute("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
        })
        .filter(|control| {
            control
                .attribute("id")
                .is_none_or(|id| !labelled.contains(id.trim()))
        })
        .map(|control| {
            Issue::new(IssueKind::FormLabelMissing, ElementKind::FormControl, url, &title)
                .with_snippet(control.outer_html())
                .with_description(format!(
                    "<{}> has no associated <label for>",
                    control.tag_name()
                ))
        })
        .collect()
}
