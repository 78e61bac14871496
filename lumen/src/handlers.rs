use anyhow::{Context, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use lumen_core::audit::count_by_kind;
use lumen_core::config::DEFAULT_REPORTS_DIR;
use lumen_core::report;
use lumen_core::{Issue, JobStatus, ReportFormat, ScanController, ScanJob, ScanRequest, ScanSettings};
use lumen_server::AppState;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use url::Url;

const SPINNER_REFRESH: Duration = Duration::from_millis(150);

pub fn print_banner() {
    println!();
    println!("{}", "  ╦  ╦ ╦╔╦╗╔═╗╔╗╔".bright_yellow().bold());
    println!("{}", "  ║  ║ ║║║║║╣ ║║║".bright_yellow().bold());
    println!("{}", "  ╩═╝╚═╝╩ ╩╚═╝╝╚╝".bright_yellow().bold());
    println!(
        "  {} {}",
        "accessibility auditor".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!();
}

// Helper functions for the scan handler

/// Load URLs from either a file or a single URL argument
pub fn load_urls_from_source(
    url: Option<&Url>,
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        Err("Either --url or --hosts-file must be provided".to_string())
    }
}

/// Load and parse URLs from a file. Blank lines and `#` comments are skipped.
pub fn load_urls_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_url_line)
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add https:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    let candidate = if line.contains("://") {
        line.to_string()
    } else {
        format!("https://{}", line)
    };

    if Url::parse(&candidate).is_ok() {
        return Some(candidate);
    }

    eprintln!("{} Skipping invalid URL '{}'", "⚠".yellow(), line);
    None
}

/// Builds scan settings from the flags shared by `serve` and `scan`.
pub fn settings_from_args(args: &ArgMatches) -> ScanSettings {
    let timeout = args.get_one::<u64>("timeout").copied().unwrap_or(5);
    let delay = args.get_one::<u64>("delay").copied().unwrap_or(100);
    let reports_dir = args
        .get_one::<String>("reports-dir")
        .map(String::as_str)
        .unwrap_or(DEFAULT_REPORTS_DIR);
    let max_pages = args.try_get_one::<usize>("max-pages").ok().flatten().copied();

    ScanSettings::default()
        .with_fetch_timeout(Duration::from_secs(timeout))
        .with_delay(Duration::from_millis(delay))
        .with_max_pages(max_pages)
        .with_reports_dir(reports_dir)
        .with_structure_checks(args.get_flag("structure"))
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn create_spinner(target: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Starting scan of {}", target));
    spinner
}

/// Runs one job to completion, mirroring the latest log line into the
/// spinner. Ctrl-C cancels the job; the pages fetched so far are still
/// audited.
pub async fn scan_target(
    controller: &ScanController,
    request: ScanRequest,
    spinner: &ProgressBar,
) -> anyhow::Result<ScanJob> {
    controller.start(request)?;

    let mut ticker = tokio::time::interval(SPINNER_REFRESH);
    let wait = controller.wait();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(wait);
    tokio::pin!(ctrl_c);
    let mut cancelled = false;

    loop {
        tokio::select! {
            _ = &mut wait => break,
            _ = &mut ctrl_c, if !cancelled => {
                cancelled = true;
                spinner.set_message("Cancelling, auditing the pages fetched so far...");
                let _ = controller.cancel();
            }
            _ = ticker.tick() => {
                if let Some(line) = controller.log().snapshot().last() {
                    spinner.set_message(line.trim().to_string());
                }
            }
        }
    }

    controller
        .status()
        .context("Scan finished without a job record")
}

/// Writes the latest result to `output`, or to the reports directory under
/// the timestamped name when no path is given.
pub fn write_scan_report(
    controller: &ScanController,
    format: ReportFormat,
    output: Option<&Path>,
) -> anyhow::Result<PathBuf> {
    match output {
        Some(path) => {
            let issues = controller.result().context("No scan result to write")?;
            let target = controller.last_target().unwrap_or_default();
            let path = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
            report::write_report(&path, format, &issues, &target)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            Ok(path)
        }
        None => Ok(controller.export(format)?.path),
    }
}

pub fn format_summary(job: &ScanJob, issues: &[Issue]) -> String {
    let mut summary = String::new();
    summary.push_str(&format!("{}\n", "═".repeat(60).bright_blue().bold()));
    summary.push_str(&format!("{}\n", "  SUMMARY".bright_white().bold()));
    summary.push_str(&format!(
        "  Target: {}\n",
        job.target.bright_white()
    ));
    summary.push_str(&format!(
        "  Pages scanned: {}\n",
        job.pages_scanned.to_string().cyan()
    ));

    if issues.is_empty() {
        summary.push_str(&format!("  {} No issues found\n", "✓".green().bold()));
        return summary;
    }

    summary.push_str(&format!(
        "  Issues found: {}\n",
        issues.len().to_string().red().bold()
    ));
    for (kind, count) in count_by_kind(issues) {
        summary.push_str(&format!(
            "    {} {:<26} {}\n",
            "•".yellow(),
            kind,
            count.to_string().cyan()
        ));
    }
    summary
}

pub async fn handle_serve(args: &ArgMatches) -> anyhow::Result<()> {
    let bind = args
        .get_one::<SocketAddr>("bind")
        .copied()
        .context("Missing --bind address")?;
    let settings = settings_from_args(args);
    let reports_dir = settings.reports_dir.clone();
    let controller =
        ScanController::from_settings(settings).context("Failed to build HTTP client")?;

    println!(
        "{} Serving on {}",
        "→".blue(),
        format!("http://{}", bind).bright_white()
    );
    println!(
        "{} Reports directory: {}",
        "→".blue(),
        reports_dir.display().to_string().bright_white()
    );

    lumen_server::serve(bind, AppState::new(controller))
        .await
        .with_context(|| format!("Server on {} stopped", bind))
}

pub async fn handle_scan(args: &ArgMatches) -> anyhow::Result<()> {
    let url = args.get_one::<Url>("url");
    let hosts_file = args.get_one::<PathBuf>("hosts-file");
    let urls = load_urls_from_source(url, hosts_file).map_err(anyhow::Error::msg)?;

    let output = args.get_one::<PathBuf>("output");
    if output.is_some() && urls.len() > 1 {
        bail!("--output can only be used with a single target");
    }

    let format = args
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Csv);
    let exclude: Vec<String> = args
        .get_many::<String>("exclude")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let max_depth = args.get_one::<usize>("max-depth").copied().unwrap_or(2);
    let single_page = args.get_flag("single-page");

    let controller = ScanController::from_settings(settings_from_args(args))
        .context("Failed to build HTTP client")?;

    print_divider();
    println!("{}", "  ACCESSIBILITY SCAN".bright_white().bold());
    print_divider();
    println!("Targets: {}", urls.len());
    if single_page {
        println!("Mode: single page");
    } else {
        println!("Max depth: {}", max_depth);
    }
    if !exclude.is_empty() {
        println!("Excluding: {}", exclude.join(", "));
    }
    println!();

    let mut failures = 0;
    for target in &urls {
        let mut request = ScanRequest::new(target.as_str())
            .with_exclude(exclude.clone())
            .with_max_depth(max_depth);
        if single_page {
            request = request.single_page();
        }

        let spinner = create_spinner(target);
        let job = scan_target(&controller, request, &spinner).await;
        spinner.finish_and_clear();

        match job {
            Ok(job) if job.status == JobStatus::Done => {
                let issues = controller.result().unwrap_or_default();
                print!("{}", format_summary(&job, &issues));
                let path = write_scan_report(&controller, format, output.map(PathBuf::as_path))?;
                info!("Report for {} written to {}", target, path.display());
                println!(
                    "  {} Report: {}\n",
                    "✓".green().bold(),
                    path.display().to_string().bright_white()
                );
            }
            Ok(job) => {
                failures += 1;
                eprintln!(
                    "{} Scan of {} failed: {}",
                    "✗".red().bold(),
                    target,
                    job.error.unwrap_or_else(|| "unknown error".to_string())
                );
            }
            Err(e) => {
                failures += 1;
                eprintln!("{} Scan of {} failed: {:#}", "✗".red().bold(), target, e);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} scans failed", failures, urls.len());
    }
    Ok(())
}
