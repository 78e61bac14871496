use crate::CLAP_STYLING;
use clap::{Arg, ArgGroup, arg, command};
use lumen_core::config::DEFAULT_REPORTS_DIR;
use std::net::SocketAddr;
use std::path::PathBuf;
use url::Url;

fn settings_args() -> [Arg; 4] {
    [
        arg!(--"reports-dir" <PATH>)
            .required(false)
            .help("Directory where exported reports are written")
            .default_value(DEFAULT_REPORTS_DIR),
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Per-page fetch timeout in seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("5"),
        arg!(--"delay" <MILLISECONDS>)
            .required(false)
            .help("Pause between two page fetches")
            .value_parser(clap::value_parser!(u64))
            .default_value("100"),
        arg!(--"structure" "Also check ARIA roles, <h1> count, iframe titles and the page lang")
            .required(false),
    ]
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("lumen")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("lumen")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("serve")
                .about("Runs the HTTP API used by the web front end")
                .arg(
                    arg!(-b --"bind" <ADDR>)
                        .required(false)
                        .help("Address to listen on")
                        .value_parser(clap::value_parser!(SocketAddr))
                        .default_value("127.0.0.1:8000"),
                )
                .args(settings_args()),
        )
        .subcommand(
            command!("scan")
                .about(
                    "Crawl a site (or a list of sites) and audit every page for accessibility \
                issues. Writes a report when done.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The URL to scan")
                        .value_parser(clap::value_parser!(Url))
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of URLs to scan")
                        .value_parser(clap::value_parser!(PathBuf))
                        .conflicts_with("url"),
                )
                .group(
                    ArgGroup::new("target")
                        .args(["url", "hosts-file"])
                        .required(true),
                )
                .arg(
                    arg!(-e --"exclude" <GLOB>)
                        .required(false)
                        .help("Skip pages whose path matches this glob (repeatable)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"max-depth" <DEPTH>)
                        .required(false)
                        .help("How many links deep to follow from the start page")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("2"),
                )
                .arg(
                    arg!(--"single-page")
                        .required(false)
                        .help("Only audit the entered URL")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"max-pages" <COUNT>)
                        .required(false)
                        .help("Stop queueing new pages after this many")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: csv, html, json")
                        .value_parser(["csv", "html", "json"])
                        .default_value("csv"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Write the report here instead of the reports directory")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .args(settings_args()),
        )
}
