use super::page_title;
use crate::model::{ElementKind, Issue, IssueKind};
use lumen_scanner::{Document, Element};

const INTERACTIVE_TAGS: [&str; 5] = ["a", "button", "input", "select", "textarea"];

/// One issue per offending element; an element that trips both conditions
/// gets both reasons in its description.
pub fn check_aria(url: &str, document: &Document) -> Vec<Issue> {
    let title = page_title(document);

    document
        .elements()
        .filter_map(|element| {
            let reasons = aria_problems(&element);
            if reasons.is_empty() {
                return None;
            }
            Some(
                Issue::new(IssueKind::AriaLabelWithoutText, ElementKind::Interactive, url, &title)
                    .with_snippet(element.outer_html())
                    .with_description(reasons.join("; ")),
            )
        })
        .collect()
}

fn aria_problems(element: &Element<'_>) -> Vec<String> {
    let mut reasons = Vec::new();

    let labelled = element
        .attribute("aria-label")
        .is_some_and(|label| !label.trim().is_empty());
    if labelled && !element.has_visible_text() {
        reasons.push("aria-label present but element has no visible text".to_string());
    }

    let hidden = element
        .attribute("aria-hidden")
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));
    if hidden && INTERACTIVE_TAGS.contains(&element.tag_name()) {
        reasons.push(format!(
            "Interactive <{}> hidden from assistive technology with aria-hidden=\"true\"",
            element.tag_name()
        ));
    }

    reasons
}
