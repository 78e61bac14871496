//! Accessibility rule checks over one parsed page.
//!
//! Every check is a plain function `check_*(url, &Document) -> Vec<Issue>`.
//! [`RuleEngine`] runs them in a fixed order and isolates them from each
//! other: a check that panics is logged and contributes no issues, and the
//! remaining checks still run.

pub mod aria;
pub mod buttons;
pub mod contrast;
pub mod forms;
pub mod headings;
pub mod images;
pub mod links;
pub mod structure;
pub mod stylesheet;

pub use aria::check_aria;
pub use buttons::check_buttons;
pub use contrast::check_contrast;
pub use forms::check_form_labels;
pub use headings::check_headings;
pub use images::check_image_alt;
pub use links::check_links;
pub use structure::{check_document_structure, check_roles};
pub use stylesheet::{BlockParser, CssRule, StylesheetParser, check_stylesheet_contrast};

use crate::model::{Issue, UNTITLED_PAGE};
use lumen_scanner::Document;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::warn;

pub type CheckFn = fn(&str, &Document) -> Vec<Issue>;

/// A named rule check.
#[derive(Clone, Copy)]
pub struct Check {
    pub name: &'static str,
    /// Human-readable label for progress logs.
    pub label: &'static str,
    pub run: CheckFn,
}

/// Label reported for the `<style>` block pass.
pub const STYLESHEET_LABEL: &str = "Stylesheets";

pub struct RuleEngine {
    checks: Vec<Check>,
    stylesheet_parser: Option<Box<dyn StylesheetParser>>,
}

impl RuleEngine {
    /// The seven page checks in their reporting order, followed by the
    /// stylesheet contrast pass over inline `<style>` blocks.
    pub fn standard() -> Self {
        Self {
            checks: vec![
                Check { name: "contrast", label: "Contrast", run: check_contrast },
                Check { name: "image_alt", label: "Image alt text", run: check_image_alt },
                Check { name: "links", label: "Links", run: check_links },
                Check { name: "buttons", label: "Buttons", run: check_buttons },
                Check { name: "form_labels", label: "Form labels", run: check_form_labels },
                Check { name: "headings", label: "Headings", run: check_headings },
                Check { name: "aria", label: "ARIA", run: check_aria },
            ],
            stylesheet_parser: Some(Box::new(BlockParser)),
        }
    }

    /// [`standard`](Self::standard) plus the structure checks, which run
    /// after the seven page checks and before the stylesheet pass.
    pub fn extended() -> Self {
        let mut engine = Self::standard();
        engine.checks.extend(structure_checks());
        engine
    }

    /// An engine with only the given checks and no stylesheet pass.
    pub fn with_checks(checks: Vec<Check>) -> Self {
        Self {
            checks,
            stylesheet_parser: None,
        }
    }

    pub fn with_stylesheet_parser(mut self, parser: Box<dyn StylesheetParser>) -> Self {
        self.stylesheet_parser = Some(parser);
        self
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn run(&self, url: &str, document: &Document) -> Vec<Issue> {
        self.run_with(url, document, |_, _| {})
    }

    /// Runs every check and calls `on_check(label, found)` after each one.
    pub fn run_with(
        &self,
        url: &str,
        document: &Document,
        mut on_check: impl FnMut(&str, usize),
    ) -> Vec<Issue> {
        let mut issues = Vec::new();

        for check in &self.checks {
            let found = guarded(check.name, url, || (check.run)(url, document));
            on_check(check.label, found.len());
            issues.extend(found);
        }

        if let Some(parser) = self.stylesheet_parser.as_deref() {
            let found = guarded("stylesheet_contrast", url, || {
                let title = page_title(document);
                document
                    .elements_by_tag("style")
                    .flat_map(|style| check_stylesheet_contrast(url, &title, &style.text(), parser))
                    .collect()
            });
            on_check(STYLESHEET_LABEL, found.len());
            issues.extend(found);
        }

        issues
    }

    /// Contrast pass over a standalone stylesheet, e.g. one posted for a
    /// single-document check. Falls back to [`BlockParser`].
    pub fn check_css(&self, url: &str, title: &str, css: &str) -> Vec<Issue> {
        let parser: &dyn StylesheetParser = self.stylesheet_parser.as_deref().unwrap_or(&BlockParser);
        guarded("stylesheet_contrast", url, || {
            check_stylesheet_contrast(url, title, css, parser)
        })
    }
}

pub fn structure_checks() -> [Check; 2] {
    [
        Check { name: "aria_roles", label: "ARIA roles", run: check_roles },
        Check { name: "document_structure", label: "Document structure", run: check_document_structure },
    ]
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::standard()
    }
}

fn guarded(name: &str, url: &str, check: impl FnOnce() -> Vec<Issue>) -> Vec<Issue> {
    match catch_unwind(AssertUnwindSafe(check)) {
        Ok(issues) => issues,
        Err(payload) => {
            warn!(
                "Check {} failed on {}: {}",
                name,
                url,
                panic_message(payload.as_ref())
            );
            Vec::new()
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

pub(crate) fn page_title(document: &Document) -> String {
    document
        .title()
        .unwrap_or_else(|| UNTITLED_PAGE.to_string())
}
