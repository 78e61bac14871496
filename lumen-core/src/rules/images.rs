use super::page_title;
use crate::model::{ElementKind, Issue, IssueKind};
use lumen_scanner::{Document, Element};
use url::Url;

/// Lazy-loading attributes, checked before `src`.
const LAZY_SOURCE_ATTRIBUTES: [&str; 3] = ["data-src", "data-lazy-src", "data-original"];

pub fn check_image_alt(url: &str, document: &Document) -> Vec<Issue> {
    let title = page_title(document);

    document
        .elements_by_tag("img")
        .filter(|img| img.attribute("alt").is_none_or(|alt| alt.trim().is_empty()))
        .map(|img| {
            let issue = Issue::new(IssueKind::ImageAltMissing, ElementKind::Image, url, &title)
                .with_snippet(img.outer_html())
                .with_description("Image missing alt text");
            match preview_source(&img, url) {
                Some(src) => issue.with_extra("preview_src", src),
                None => issue,
            }
        })
        .collect()
}

/// Best-effort absolute URL of the image, for report previews.
pub fn preview_source(img: &Element<'_>, page_url: &str) -> Option<String> {
    let srcset_first = img.attribute("data-srcset").and_then(|srcset| {
        srcset
            .split(',')
            .next()
            .and_then(|candidate| candidate.split_whitespace().next())
    });

    let candidate = LAZY_SOURCE_ATTRIBUTES
        .iter()
        .map(|name| img.attribute(name))
        .chain([srcset_first, img.attribute("src")])
        .flatten()
        .map(str::trim)
        .find(|src| !src.is_empty() && !src.to_ascii_lowercase().starts_with("data:"))?;

    let resolved = Url::parse(page_url).ok()?.join(candidate).ok()?;
    Some(resolved.to_string())
}
