// Issue data model shared by rules, reports and the HTTP layer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Title used for pages without a usable `<title>`.
pub const UNTITLED_PAGE: &str = "Untitled page";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    ContrastInsufficient,
    ImageAltMissing,
    LinkIncomplete,
    NonsemanticButton,
    FormLabelMissing,
    HeadingHierarchyError,
    AriaLabelWithoutText,
    AriaRoleInvalid,
    AriaRoleUnnamed,
    /// Zero or several `<h1>` on one page.
    H1Count,
    IframeTitleMissing,
    HtmlLangMissing,
    /// A color value the contrast checks could not interpret.
    ColorUnparsed,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::ContrastInsufficient => "contrast_insufficient",
            IssueKind::ImageAltMissing => "image_alt_missing",
            IssueKind::LinkIncomplete => "link_incomplete",
            IssueKind::NonsemanticButton => "nonsemantic_button",
            IssueKind::FormLabelMissing => "form_label_missing",
            IssueKind::HeadingHierarchyError => "heading_hierarchy_error",
            IssueKind::AriaLabelWithoutText => "aria_label_without_text",
            IssueKind::AriaRoleInvalid => "aria_role_invalid",
            IssueKind::AriaRoleUnnamed => "aria_role_unnamed",
            IssueKind::H1Count => "h1_count",
            IssueKind::IframeTitleMissing => "iframe_title_missing",
            IssueKind::HtmlLangMissing => "html_lang_missing",
            IssueKind::ColorUnparsed => "color_unparsed",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What sort of markup an issue points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Text,
    Image,
    Link,
    Button,
    FormControl,
    Heading,
    Interactive,
    Stylesheet,
    Frame,
    Document,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Image => "image",
            ElementKind::Link => "link",
            ElementKind::Button => "button",
            ElementKind::FormControl => "form_control",
            ElementKind::Heading => "heading",
            ElementKind::Interactive => "interactive",
            ElementKind::Stylesheet => "stylesheet",
            ElementKind::Frame => "frame",
            ElementKind::Document => "document",
        }
    }
}

/// One accessibility defect found on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub description: String,
    pub element: ElementKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Issue {
    pub fn new(
        kind: IssueKind,
        element: ElementKind,
        url: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            url: url.into(),
            title: title.into(),
            snippet: String::new(),
            description: String::new(),
            element,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
