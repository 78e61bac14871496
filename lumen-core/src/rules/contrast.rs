//! Text/background contrast of inline `style` attributes.
//!
//! The inline check only understands six-digit hex colors; anything else in
//! a `color`/`background` pair is reported as [`IssueKind::ColorUnparsed`]
//! rather than silently ignored. Stylesheet rules go through
//! [`super::stylesheet`], which accepts more color syntaxes.

use super::page_title;
use crate::model::{ElementKind, Issue, IssueKind};
use lumen_scanner::Document;

/// WCAG AA minimum for normal-size text.
pub const MIN_CONTRAST_RATIO: f64 = 4.5;

pub type Rgb = (u8, u8, u8);

/// Parses `#rrggbb`. Shorthand and named colors are rejected.
pub fn parse_hex6(value: &str) -> Option<Rgb> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Relative luminance with the 0.03928 sRGB linearization threshold.
pub fn relative_luminance((r, g, b): Rgb) -> f64 {
    let channel = |c: u8| {
        let v = c as f64 / 255.0;
        if v <= 0.03928 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
}

/// Returns a ratio in `[1.0, 21.0]`, symmetric in its arguments.
pub fn contrast_ratio(fg: Rgb, bg: Rgb) -> f64 {
    let l1 = relative_luminance(fg);
    let l2 = relative_luminance(bg);
    let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Splits `a: b; c: d` into lowercase names and trimmed values.
/// A trailing `!important` is dropped from the value.
pub fn parse_declarations(block: &str) -> Vec<(String, String)> {
    block
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .map(|(name, value)| {
            let value = value.trim();
            let value = value
                .strip_suffix("!important")
                .map(str::trim_end)
                .unwrap_or(value);
            (name.trim().to_ascii_lowercase(), value.to_string())
        })
        .filter(|(name, value)| !name.is_empty() && !value.is_empty())
        .collect()
}

/// Last `color` and last `background-color`/`background` of a declaration list.
pub fn color_pair(declarations: &[(String, String)]) -> Option<(&str, &str)> {
    let mut color = None;
    let mut background = None;
    for (name, value) in declarations {
        match name.as_str() {
            "color" => color = Some(value.as_str()),
            "background-color" | "background" => background = Some(value.as_str()),
            _ => {}
        }
    }
    Some((color?, background?))
}

pub fn check_contrast(url: &str, document: &Document) -> Vec<Issue> {
    let title = page_title(document);
    let mut issues = Vec::new();

    for element in document.elements_with_attribute("style") {
        let Some(style) = element.attribute("style") else {
            continue;
        };
        let declarations = parse_declarations(style);
        let Some((color, background)) = color_pair(&declarations) else {
            continue;
        };

        match (parse_hex6(color), parse_hex6(background)) {
            (Some(fg), Some(bg)) => {
                let ratio = contrast_ratio(fg, bg);
                if ratio < MIN_CONTRAST_RATIO {
                    issues.push(low_contrast_issue(
                        url,
                        &title,
                        ElementKind::Text,
                        element.outer_html(),
                        color,
                        background,
                        ratio,
                    ));
                }
            }
            _ => issues.push(unparsed_color_issue(
                url,
                &title,
                ElementKind::Text,
                element.outer_html(),
                color,
                background,
            )),
        }
    }

    issues
}

pub(crate) fn low_contrast_issue(
    url: &str,
    title: &str,
    element: ElementKind,
    snippet: String,
    color: &str,
    background: &str,
    ratio: f64,
) -> Issue {
    let ratio = round2(ratio);
    Issue::new(IssueKind::ContrastInsufficient, element, url, title)
        .with_snippet(snippet)
        .with_description(format!(
            "Low contrast ({:.2}:1) between text color {} and background {}; at least {}:1 is required",
            ratio, color, background, MIN_CONTRAST_RATIO
        ))
        .with_extra("ratio", format!("{:.2}", ratio))
        .with_extra("foreground", color)
        .with_extra("background", background)
}

pub(crate) fn unparsed_color_issue(
    url: &str,
    title: &str,
    element: ElementKind,
    snippet: String,
    color: &str,
    background: &str,
) -> Issue {
    Issue::new(IssueKind::ColorUnparsed, element, url, title)
        .with_snippet(snippet)
        .with_description(format!(
            "Could not evaluate contrast between colors {} / {}",
            color, background
        ))
        .with_extra("foreground", color)
        .with_extra("background", background)
}
