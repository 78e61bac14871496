// Tests for the accessibility rule checks

use lumen_core::model::{ElementKind, Issue, IssueKind, UNTITLED_PAGE};
use lumen_core::rules::*;
use lumen_scanner::Document;

const URL: &str = "https://example.com/page";

fn run(check: CheckFn, body: &str) -> Vec<Issue> {
    let markup = format!(
        "<html><head><title>Fixture</title></head><body>{}</body></html>",
        body
    );
    check(URL, &Document::parse(&markup))
}

// ============================================================================
// Contrast Tests
// ============================================================================

#[test]
fn test_gray_on_gray_is_flagged() {
    let issues = run(
        check_contrast,
        r#"<p style="color: #777777; background-color: #808080">Low</p>"#,
    );

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::ContrastInsufficient);
    assert_eq!(issues[0].element, ElementKind::Text);
    let ratio: f64 = issues[0].extra["ratio"].parse().unwrap();
    assert!(ratio < 4.5);
    assert_eq!(issues[0].extra["ratio"], "1.13");
}

#[test]
fn test_black_on_white_passes() {
    let issues = run(
        check_contrast,
        r#"<p style="color:#000000;background:#ffffff">Readable</p>"#,
    );
    assert!(issues.is_empty());
}

#[test]
fn test_style_without_both_colors_is_ignored() {
    let issues = run(check_contrast, r#"<p style="color: #777777">Only fg</p>"#);
    assert!(issues.is_empty());
}

#[test]
fn test_short_hex_inline_is_a_diagnostic() {
    let issues = run(
        check_contrast,
        r#"<p style="color: #777; background: #808080">Short</p>"#,
    );

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::ColorUnparsed);
}

#[test]
fn test_style_block_is_checked_by_engine() {
    let markup = r#"<html><head><style>.muted { color: #999; background: #aaa }</style></head>
        <body><p class="muted">x</p></body></html>"#;
    let issues = RuleEngine::standard().run(URL, &Document::parse(markup));

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].element, ElementKind::Stylesheet);
    assert_eq!(issues[0].title, UNTITLED_PAGE);
}

// ============================================================================
// Image Alt Tests
// ============================================================================

#[test]
fn test_missing_and_blank_alt_are_flagged() {
    let issues = run(
        check_image_alt,
        r#"<img src="/a.png"><img src="/b.png" alt="  "><img src="/c.png" alt="Logo">"#,
    );

    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|i| i.kind == IssueKind::ImageAltMissing));
    assert_eq!(issues[0].extra["preview_src"], "https://example.com/a.png");
    assert_eq!(issues[0].title, "Fixture");
}

#[test]
fn test_image_without_any_source_has_no_preview() {
    let issues = run(check_image_alt, r#"<img>"#);
    assert_eq!(issues.len(), 1);
    assert!(!issues[0].extra.contains_key("preview_src"));
}

// ============================================================================
// Link Tests
// ============================================================================

#[test]
fn test_links_without_href_or_text() {
    let issues = run(
        check_links,
        r#"<a>No href</a><a href="/x">   </a><a href="/about">About</a>"#,
    );

    assert_eq!(issues.len(), 2);
    assert!(issues[0].snippet.contains("No href"));
    assert!(issues.iter().all(|i| i.element == ElementKind::Link));
}

// ============================================================================
// Button Tests
// ============================================================================

#[test]
fn test_clickable_div_and_span_role_button() {
    let issues = run(
        check_buttons,
        r#"<div onclick="go()">Go</div>
           <span role="button">Menu</span>
           <div role="navigation">Nav</div>
           <button>Real</button>"#,
    );

    assert_eq!(issues.len(), 2);
    assert!(issues[0].description.contains("<div>"));
    assert!(issues[1].description.contains("<span>"));
}

// ============================================================================
// Form Label Tests
// ============================================================================

#[test]
fn test_form_controls_need_a_label_for() {
    let issues = run(
        check_form_labels,
        r#"<label for="name">Name</label><input id="name">
           <input type="hidden" name="csrf">
           <select name="country"></select>
           <textarea id="bio"></textarea>"#,
    );

    assert_eq!(issues.len(), 2);
    assert!(issues[0].snippet.starts_with("<select"));
    assert!(issues[1].snippet.starts_with("<textarea"));
}

// ============================================================================
// Heading Tests
// ============================================================================

#[test]
fn test_heading_jump_h1_h2_h4() {
    let issues = run(check_headings, "<h1>A</h1><h2>B</h2><h4>C</h4>");

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::HeadingHierarchyError);
    assert!(issues[0].snippet.contains("<h4>"));
    assert!(issues[0].description.contains("h4 follows h2"));
}

#[test]
fn test_heading_sequence_h1_h2_h3_is_fine() {
    assert!(run(check_headings, "<h1>A</h1><h2>B</h2><h3>C</h3>").is_empty());
}

#[test]
fn test_heading_going_up_is_fine() {
    assert!(run(check_headings, "<h2>A</h2><h1>B</h1>").is_empty());
    assert!(run(check_headings, "<h1>A</h1><h2>B</h2><h3>C</h3><h2>D</h2>").is_empty());
}

#[test]
fn test_each_jump_is_reported() {
    let issues = run(check_headings, "<h1>A</h1><h3>B</h3><h1>C</h1><h6>D</h6>");
    assert_eq!(issues.len(), 2);
}

#[test]
fn test_links_with_empty_or_blank_href() {
    let issues = run(
        check_links,
        r##"<a href="">Home</a><a href="   ">Blank</a><a href="#top">Top</a>"##,
    );

    assert_eq!(issues.len(), 2);
    assert!(issues[0].snippet.contains("Home"));
    assert!(issues[1].snippet.contains("Blank"));
}

// ============================================================================
// ARIA Tests
// ============================================================================

#[test]
fn test_aria_label_without_visible_text() {
    let issues = run(
        check_aria,
        r#"<span aria-label="Close"></span>
           <button aria-label="Close">X</button>
           <div aria-label="  "></div>"#,
    );

    assert_eq!(issues.len(), 1);
    assert!(issues[0].snippet.starts_with("<span"));
}

#[test]
fn test_aria_hidden_on_interactive_elements() {
    let issues = run(
        check_aria,
        r#"<button aria-hidden="true">Hidden</button>
           <div aria-hidden="true">Decorative</div>
           <a href="/" aria-hidden="false">Home</a>"#,
    );

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::AriaLabelWithoutText);
    assert!(issues[0].description.contains("<button>"));
}

#[test]
fn test_aria_hidden_value_is_case_insensitive() {
    let issues = run(
        check_aria,
        r#"<a href="/" aria-hidden="TRUE">Home</a><input aria-hidden="True">"#,
    );

    assert_eq!(issues.len(), 2);
    assert!(issues[0].description.contains("<a>"));
    assert!(issues[1].description.contains("<input>"));
}

#[test]
fn test_aria_reasons_merge_into_one_issue() {
    let issues = run(
        check_aria,
        r#"<button aria-label="Close" aria-hidden="true"></button>"#,
    );

    assert_eq!(issues.len(), 1);
    assert!(issues[0].description.contains("aria-label present"));
    assert!(issues[0].description.contains("aria-hidden=\"true\""));
}

// ============================================================================
// Structure Tests
// ============================================================================

#[test]
fn test_unknown_and_unnamed_roles() {
    let issues = run(
        check_roles,
        r#"<div role="buton">Typo</div>
           <span role="button"></span>
           <span role="link" aria-label="Docs"></span>
           <nav role="Navigation">Menu</nav>"#,
    );

    let kinds: Vec<_> = issues.iter().map(|issue| issue.kind).collect();
    assert_eq!(kinds, vec![IssueKind::AriaRoleInvalid, IssueKind::AriaRoleUnnamed]);
    assert_eq!(issues[0].extra["role"], "buton");
    assert_eq!(issues[1].extra["role"], "button");
}

#[test]
fn test_h1_count_iframe_title_and_lang() {
    let markup = r#"<html><head><title>Docs</title></head><body>
        <h1>One</h1><h1>Two</h1>
        <iframe src="/map"></iframe>
        <iframe src="/video" title="Intro video"></iframe>
    </body></html>"#;
    let issues = check_document_structure(URL, &Document::parse(markup));

    let kinds: Vec<_> = issues.iter().map(|issue| issue.kind).collect();
    assert_eq!(
        kinds,
        vec![
            IssueKind::H1Count,
            IssueKind::IframeTitleMissing,
            IssueKind::HtmlLangMissing,
        ]
    );
    assert_eq!(issues[0].extra["count"], "2");
    assert!(issues[1].description.contains("/map"));
    assert_eq!(issues[2].element, ElementKind::Document);
}

#[test]
fn test_well_formed_document_has_no_structure_issues() {
    let markup = r#"<html lang="en"><head><title>Ok</title></head><body>
        <h1>Only</h1><iframe src="/m" title="Map"></iframe></body></html>"#;
    assert!(check_document_structure(URL, &Document::parse(markup)).is_empty());

    let missing = check_document_structure(URL, &Document::parse(r#"<html lang="en"><p>x</p></html>"#));
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].extra["count"], "0");
}

// ============================================================================
// Engine Tests
// ============================================================================

const ALL_CHECKS_FIXTURE: &str = r#"<html><head><title>Fixture</title></head><body>
    <p style="color: #777777; background-color: #808080">Low</p>
    <img src="/a.png">
    <a href="/x"></a>
    <div onclick="go()">Go</div>
    <input id="email" type="text">
    <h1>One</h1><h3>Three</h3>
    <button aria-hidden="true">Hidden</button>
</body></html>"#;

#[test]
fn test_engine_keeps_check_declaration_order() {
    let issues = RuleEngine::standard().run(URL, &Document::parse(ALL_CHECKS_FIXTURE));
    let kinds: Vec<_> = issues.iter().map(|issue| issue.kind).collect();

    assert_eq!(
        kinds,
        vec![
            IssueKind::ContrastInsufficient,
            IssueKind::ImageAltMissing,
            IssueKind::LinkIncomplete,
            IssueKind::NonsemanticButton,
            IssueKind::FormLabelMissing,
            IssueKind::HeadingHierarchyError,
            IssueKind::AriaLabelWithoutText,
        ]
    );
    assert!(issues.iter().all(|issue| issue.url == URL));
}

#[test]
fn test_extended_engine_appends_structure_checks() {
    assert_eq!(RuleEngine::standard().checks().len(), 7);
    let engine = RuleEngine::extended();
    let names: Vec<_> = engine.checks().iter().map(|check| check.name).collect();
    assert_eq!(names.len(), 9);
    assert_eq!(&names[7..], &["aria_roles", "document_structure"]);

    let issues = engine.run(URL, &Document::parse(ALL_CHECKS_FIXTURE));
    let kinds: Vec<_> = issues.iter().map(|issue| issue.kind).collect();
    assert_eq!(kinds.last(), Some(&IssueKind::HtmlLangMissing));
    assert!(
        !RuleEngine::standard()
            .run(URL, &Document::parse(ALL_CHECKS_FIXTURE))
            .iter()
            .any(|issue| issue.kind == IssueKind::HtmlLangMissing)
    );
}

#[test]
fn test_engine_reports_progress_per_check() {
    let mut labels = Vec::new();
    RuleEngine::standard().run_with(URL, &Document::parse(ALL_CHECKS_FIXTURE), |label, found| {
        labels.push((label.to_string(), found));
    });

    assert_eq!(labels.len(), 8);
    assert_eq!(labels[0], ("Contrast".to_string(), 1));
    assert_eq!(labels[7], (STYLESHEET_LABEL.to_string(), 0));
}

fn exploding_check(_url: &str, _document: &Document) -> Vec<Issue> {
    panic!("check blew up");
}

#[test]
fn test_panicking_check_does_not_stop_the_others() {
    let engine = RuleEngine::with_checks(vec![
        Check {
            name: "boom",
            label: "Boom",
            run: exploding_check,
        },
        Check {
            name: "links",
            label: "Links",
            run: check_links,
        },
    ]);

    let issues = engine.run(URL, &Document::parse("<a>No href</a>"));
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::LinkIncomplete);
}

#[test]
fn test_unusual_markup_never_panics() {
    let engine = RuleEngine::standard();
    for markup in [
        "",
        "<<<>>>",
        "<h7>x</h7><hx>y</hx>",
        r#"<img data-srcset=",,,"><p style=";;:;">"#,
        "<style>{{}}</style><label for>x</label><input id>",
    ] {
        let _ = engine.run(URL, &Document::parse(markup));
    }
}
