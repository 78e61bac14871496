//! Contrast of color pairs declared in stylesheet rules.

use super::contrast::{
    MIN_CONTRAST_RATIO, Rgb, color_pair, contrast_ratio, low_contrast_issue, parse_declarations,
    unparsed_color_issue,
};
use crate::model::{ElementKind, Issue};
use regex::Regex;
use std::sync::LazyLock;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));
static BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^{}]+)\{([^{}]*)\}").expect("valid regex"));
static RGB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq)]
pub struct CssRule {
    pub selector: String,
    pub declarations: Vec<(String, String)>,
}

/// Turns stylesheet source into `(selector, declarations)` pairs.
pub trait StylesheetParser: Send + Sync {
    fn parse(&self, css: &str) -> Vec<CssRule>;
}

/// Flat block parser: innermost `selector { ... }` blocks only, comments
/// stripped, at-rule preludes and `;`-terminated at-statements skipped. Good enough for contrast pairs; it is
/// not a CSS tokenizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockParser;

impl StylesheetParser for BlockParser {
    fn parse(&self, css: &str) -> Vec<CssRule> {
        let css = COMMENT_RE.replace_all(css, "");
        BLOCK_RE
            .captures_iter(&css)
            .filter_map(|caps| {
                // `@charset "x";` and `@import ...;` run into the next selector
                let selector = caps[1].rsplit(';').next().unwrap_or_default().trim();
                // `@font-face { ... }` and friends
                if selector.is_empty() || selector.starts_with('@') {
                    return None;
                }
                Some(CssRule {
                    selector: selector.to_string(),
                    declarations: parse_declarations(&caps[2]),
                })
            })
            .collect()
    }
}

/// Parses `#rgb`, `#rrggbb`, `rgb(r, g, b)` and `rgba(r, g, b, a)`.
pub fn parse_css_color(value: &str) -> Option<Rgb> {
    let value = value.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return None,
        };
        let r = u8::from_str_radix(&expanded[0..2], 16).ok()?;
        let g = u8::from_str_radix(&expanded[2..4], 16).ok()?;
        let b = u8::from_str_radix(&expanded[4..6], 16).ok()?;
        return Some((r, g, b));
    }

    let caps = RGB_RE.captures(&value)?;
    Some((
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    ))
}

pub fn check_stylesheet_contrast(
    url: &str,
    title: &str,
    css: &str,
    parser: &dyn StylesheetParser,
) -> Vec<Issue> {
    let mut issues = Vec::new();

    for rule in parser.parse(css) {
        let Some((color, background)) = color_pair(&rule.declarations) else {
            continue;
        };
        let snippet = format!(
            "{} {{ color: {}; background: {} }}",
            rule.selector, color, background
        );

        match (parse_css_color(color), parse_css_color(background)) {
            (Some(fg), Some(bg)) => {
                let ratio = contrast_ratio(fg, bg);
                if ratio < MIN_CONTRAST_RATIO {
                    issues.push(
                        low_contrast_issue(
                            url,
                            title,
                            ElementKind::Stylesheet,
                            snippet,
                            color,
                            background,
                            ratio,
                        )
                        .with_extra("selector", &rule.selector),
                    );
                }
            }
            _ => issues.push(
                unparsed_color_issue(
                    url,
                    title,
                    ElementKind::Stylesheet,
                    snippet,
                    color,
                    background,
                )
                .with_extra("selector", &rule.selector),
            ),
        }
    }

    issues
}
