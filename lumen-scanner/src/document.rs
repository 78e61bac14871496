//! Typed, read-only query layer over a parsed HTML document.
//!
//! Rule checks only see [`Document`] and [`Element`]; they never touch the
//! underlying `scraper` tree, which keeps every check testable against a
//! markup fixture.

use scraper::{ElementRef, Html};

pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = Element<'_>> + '_ {
        self.html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .map(Element)
    }

    pub fn elements_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = Element<'a>> + 'a {
        self.elements()
            .filter(move |element| element.tag_name().eq_ignore_ascii_case(tag))
    }

    /// Elements whose tag is any of `tags`, still in document order.
    pub fn elements_by_tags<'a>(
        &'a self,
        tags: &'a [&'a str],
    ) -> impl Iterator<Item = Element<'a>> + 'a {
        self.elements().filter(move |element| {
            tags.iter()
                .any(|tag| element.tag_name().eq_ignore_ascii_case(tag))
        })
    }

    pub fn elements_with_attribute<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = Element<'a>> + 'a {
        self.elements()
            .filter(move |element| element.has_attribute(name))
    }

    /// Elements whose `name` attribute equals `value`, ignoring ASCII case
    /// and surrounding whitespace (`aria-hidden="TRUE"` counts as `"true"`).
    pub fn elements_with_attribute_value<'a>(
        &'a self,
        name: &'a str,
        value: &'a str,
    ) -> impl Iterator<Item = Element<'a>> + 'a {
        self.elements()
            .filter(move |element| {
                element
                    .attribute(name)
                    .is_some_and(|actual| actual.trim().eq_ignore_ascii_case(value))
            })
    }

    /// Trimmed text of the first `<title>`, if it has any.
    pub fn title(&self) -> Option<String> {
        self.elements_by_tag("title")
            .next()
            .map(|title| title.text().trim().to_string())
            .filter(|title| !title.is_empty())
    }

    /// Raw `href` values of every anchor, in document order.
    pub fn anchor_hrefs(&self) -> Vec<String> {
        self.elements_by_tag("a")
            .filter_map(|anchor| anchor.attribute("href"))
            .map(str::to_string)
            .collect()
    }
}

#[derive(Clone, Copy)]
pub struct Element<'a>(ElementRef<'a>);

impl<'a> Element<'a> {
    /// Lowercase local name, e.g. `"img"`.
    pub fn tag_name(&self) -> &'a str {
        self.0.value().name()
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Concatenated text content of the element and its descendants.
    pub fn text(&self) -> String {
        self.0.text().collect()
    }

    pub fn has_visible_text(&self) -> bool {
        self.0.text().any(|chunk| !chunk.trim().is_empty())
    }

    /// Serialized markup of the element, used as the issue snippet.
    pub fn outer_html(&self) -> String {
        self.0.html()
    }
}

impl std::fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag_name())
            .finish()
    }
}
