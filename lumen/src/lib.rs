pub mod handlers;

pub use handlers::{
    format_summary, load_urls_from_file, load_urls_from_source, parse_url_line, scan_target,
    settings_from_args, write_scan_report,
};
