use colored::Colorize;
use commands::command_argument_builder;
use lumen::handlers::{handle_scan, handle_serve, print_banner};
use tracing_subscriber::EnvFilter;

mod commands;

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env("LUMEN_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let result = match chosen_command.subcommand() {
        Some(("serve", primary_command)) => {
            init_tracing("info");
            handle_serve(primary_command).await
        }
        Some(("scan", primary_command)) => {
            // keep the spinner readable unless asked otherwise
            init_tracing("warn");
            handle_scan(primary_command).await
        }
        // No subcommand provided, just show the banner
        _ => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
