//! Opt-in document structure checks: ARIA role validity, a single `<h1>`,
//! titled iframes and a declared page language.
//!
//! These run only on engines built with [`RuleEngine::extended`] and report
//! their own issue kinds, so the standard seven checks are unaffected.
//!
//! [`RuleEngine::extended`]: super::RuleEngine::extended

use super::page_title;
use crate::model::{ElementKind, Issue, IssueKind};
use lumen_scanner::Document;

/// Roles accepted by [`check_roles`]: a common subset of WAI-ARIA.
pub const KNOWN_ROLES: [&str; 31] = [
    "alert",
    "banner",
    "button",
    "cell",
    "checkbox",
    "columnheader",
    "complementary",
    "contentinfo",
    "dialog",
    "form",
    "grid",
    "heading",
    "link",
    "listbox",
    "main",
    "menu",
    "menubar",
    "menuitem",
    "navigation",
    "progressbar",
    "radio",
    "region",
    "row",
    "rowheader",
    "search",
    "status",
    "switch",
    "tab",
    "tabpanel",
    "textbox",
    "tooltip",
];

/// Roles that need an accessible name.
const NAMED_ROLES: [&str; 5] = ["button", "link", "textbox", "switch", "checkbox"];

pub fn check_roles(url: &str, document: &Document) -> Vec<Issue> {
    let title = page_title(document);
    let mut issues = Vec::new();

    for element in document.elements_with_attribute("role") {
        let role = element.attribute("role").unwrap_or_default().trim().to_ascii_lowercase();

        if role.is_empty()
            || role
                .split_ascii_whitespace()
                .any(|token| !KNOWN_ROLES.contains(&token))
        {
            issues.push(
                Issue::new(IssueKind::AriaRoleInvalid, ElementKind::Interactive, url, &title)
                    .with_snippet(element.outer_html())
                    .with_description(format!("Unknown or invalid role=\"{}\"", role))
                    .with_extra("role", &role),
            );
            continue;
        }

        let named = ["aria-label", "aria-labelledby"]
            .iter()
            .any(|attr| element.attribute(attr).is_some_and(|v| !v.trim().is_empty()))
            || element.has_visible_text();
        if NAMED_ROLES.contains(&role.as_str()) && !named {
            issues.push(
                Issue::new(IssueKind::AriaRoleUnnamed, ElementKind::Interactive, url, &title)
                    .with_snippet(element.outer_html())
                    .with_description(format!(
                        "role=\"{}\" without text, aria-label or aria-labelledby",
                        role
                    ))
                    .with_extra("role", &role),
            );
        }
    }

    issues
}

/// Missing or repeated `<h1>`, untitled `<iframe>`s, and `<html>` without `lang`.
pub fn check_document_structure(url: &str, document: &Document) -> Vec<Issue> {
    let title = page_title(document);
    let mut issues = Vec::new();

    let h1s: Vec<_> = document.elements_by_tag("h1").collect();
    match h1s.len() {
        0 => issues.push(
            Issue::new(IssueKind::H1Count, ElementKind::Heading, url, &title)
                .with_snippet("<body> without <h1>")
                .with_description("No <h1> element found")
                .with_extra("count", "0"),
        ),
        1 => {}
        count => issues.push(
            Issue::new(IssueKind::H1Count, ElementKind::Heading, url, &title)
                .with_snippet(
                    h1s.iter()
                        .map(|h1| h1.outer_html())
                        .collect::<Vec<_>>()
                        .join("\n"),
                )
                .with_description(format!("{} <h1> elements found; expected one", count))
                .with_extra("count", count.to_string()),
        ),
    }

    for iframe in document.elements_by_tag("iframe") {
        if iframe.attribute("title").is_none_or(|t| t.trim().is_empty()) {
            issues.push(
                Issue::new(IssueKind::IframeTitleMissing, ElementKind::Frame, url, &title)
                    .with_snippet(iframe.outer_html())
                    .with_description(format!(
                        "Iframe without title: {}",
                        iframe.attribute("src").unwrap_or("(no src)")
                    )),
            );
        }
    }

    let lang_missing = document
        .elements_by_tag("html")
        .next()
        .is_none_or(|html| html.attribute("lang").is_none_or(|lang| lang.trim().is_empty()));
    if lang_missing {
        issues.push(
            Issue::new(IssueKind::HtmlLangMissing, ElementKind::Document, url, &title)
                .with_snippet("<html>")
                .with_description("No lang attribute on the <html> element"),
        );
    }

    issues
}
