use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use console::style;
use sitecheck::{checker, logging, network, options};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    // Parse terminal arguments.
    let mut options = options::Cli::parse();
    logging::init_logging(options.verbose);

    // Load config file and apply values (CLI args take priority).
    let config = options::ConfigFile::load(options.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("{} {}", style("[ERROR]").red(), e);
        std::process::exit(1);
    });
    options.apply_config(&config);

    let settings = options.settings().unwrap_or_else(|e| {
        eprintln!("{} {}", style("[ERROR]").red(), e);
        std::process::exit(1);
    });
    tracing::debug!(?settings, "resolved settings");

    // Build the HTTP client.
    let client = network::build_client(&settings)?;

    // Check every sitemap in order; progress goes to stdout.
    let summary = checker::run(&client, &settings, &mut std::io::stdout()).await;

    Ok(summary.exit_code())
}
