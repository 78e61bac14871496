// Report rendering for completed scans

use crate::model::Issue;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("No scan data available for export")]
    NoData,

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Html,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ReportFormat::Csv),
            "html" | "htm" => Some(ReportFormat::Html),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Csv => "text/csv; charset=utf-8",
            ReportFormat::Html => "text/html; charset=utf-8",
            ReportFormat::Json => "application/json",
        }
    }
}

/// A report written to disk.
#[derive(Debug, Clone)]
pub struct SavedReport {
    pub path: PathBuf,
    pub filename: String,
    pub content: String,
}

const COLUMNS: [&str; 5] = ["ID", "Kind", "Description", "URL", "Snippet"];

/// Issues ordered by `(kind, url)`; ties keep their original order.
pub fn sorted_issues(issues: &[Issue]) -> Vec<&Issue> {
    let mut sorted: Vec<&Issue> = issues.iter().collect();
    sorted.sort_by(|a, b| {
        a.kind
            .as_str()
            .cmp(b.kind.as_str())
            .then_with(|| a.url.cmp(&b.url))
    });
    sorted
}

pub fn render_csv(issues: &[Issue]) -> String {
    let mut csv = String::new();
    csv.push_str(&COLUMNS.join(","));
    csv.push_str("\r\n");

    for (idx, issue) in sorted_issues(issues).into_iter().enumerate() {
        let row = [
            (idx + 1).to_string(),
            csv_field(issue.kind.as_str()),
            csv_field(&issue.description),
            csv_field(&issue.url),
            csv_field(&issue.snippet),
        ];
        csv.push_str(&row.join(","));
        csv.push_str("\r\n");
    }

    csv
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn render_html(issues: &[Issue], website: &str) -> String {
    let website = escape_html(website);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(&format!(
        "<title>Accessibility report - {}</title>\n",
        website
    ));
    html.push_str(
        r#"<style>
body { font-family: Arial, sans-serif; margin: 2rem; color: #222; }
h1 { font-size: 1.5rem; margin-bottom: 1rem; }
table { border-collapse: collapse; width: 100%; font-size: 0.95rem; }
th, td { border: 1px solid #ccc; padding: 0.5rem; text-align: left; vertical-align: top; }
th { background-color: #f2f2f2; }
a { color: #0057d9; text-decoration: none; }
a:hover { text-decoration: underline; }
pre { white-space: pre-wrap; word-break: break-word; margin: 0; }
</style>
</head>
<body>
"#,
    );
    html.push_str(&format!("<h1>Accessibility report - {}</h1>\n", website));
    html.push_str(&format!("<p>{} issues found.</p>\n", issues.len()));
    html.push_str("<table>\n<tr>");
    for column in COLUMNS {
        html.push_str(&format!("<th>{}</th>", column));
    }
    html.push_str("</tr>\n");

    for (idx, issue) in sorted_issues(issues).into_iter().enumerate() {
        let url = escape_html(&issue.url);
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td><a href=\"{}\">{}</a></td><td><pre>{}</pre></td></tr>\n",
            idx + 1,
            issue.kind.as_str(),
            escape_html(&issue.description),
            url,
            url,
            escape_html(&issue.snippet),
        ));
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}

pub fn render_json(issues: &[Issue]) -> Result<String, ReportError> {
    let sorted = sorted_issues(issues);
    Ok(serde_json::to_string_pretty(&sorted)?)
}

pub fn render(format: ReportFormat, issues: &[Issue], website: &str) -> Result<String, ReportError> {
    match format {
        ReportFormat::Csv => Ok(render_csv(issues)),
        ReportFormat::Html => Ok(render_html(issues, website)),
        ReportFormat::Json => render_json(issues),
    }
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Keeps alphanumerics, space, `_` and `-`, then trims trailing whitespace.
pub fn sanitize_filename(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// `D<ddmmyyyy>_T<HHMM>_<host>.<ext>`, e.g. `D05032025_T1412_examplecom.csv`.
/// The host keeps its port; a missing or fully stripped host becomes `unknown`.
pub fn report_filename(website: &str, format: ReportFormat, now: DateTime<Local>) -> String {
    let netloc = Url::parse(website)
        .ok()
        .and_then(|url| {
            url.host_str().map(|host| match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            })
        })
        .unwrap_or_default();

    let mut host = sanitize_filename(&netloc);
    if host.is_empty() {
        host = "unknown".to_string();
    }

    format!(
        "{}_{}_{}.{}",
        now.format("D%d%m%Y"),
        now.format("T%H%M"),
        host,
        format.extension()
    )
}

/// Renders `issues` and writes them into `dir`, creating it if needed.
pub fn save_report(
    dir: &Path,
    format: ReportFormat,
    issues: &[Issue],
    website: &str,
) -> Result<SavedReport, ReportError> {
    let content = render(format, issues, website)?;
    let filename = report_filename(website, format, Local::now());

    fs::create_dir_all(dir)?;
    let path = dir.join(&filename);
    fs::write(&path, &content)?;

    Ok(SavedReport {
        path,
        filename,
        content,
    })
}

/// Writes a report to an explicit path instead of a generated name.
pub fn write_report(
    path: &Path,
    format: ReportFormat,
    issues: &[Issue],
    website: &str,
) -> Result<(), ReportError> {
    let content = render(format, issues, website)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
