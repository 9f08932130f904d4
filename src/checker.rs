use crate::error::CheckError;
use crate::network;
use crate::options::Settings;
use crate::report::ReportWriter;
use crate::sitemap::read_locations;
use crate::utils;
use console::style;
use futures::StreamExt;
use futures::stream;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

const SEPARATOR: &str = "================================================";

// region: Structs
/// Result of checking one sitemap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub sitemap: String,
    pub result_path: PathBuf,
    pub checked: usize,
    pub failed: usize,
}

/// Result of checking every sitemap argument.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub completed: Vec<Summary>,
    pub errors: Vec<(String, CheckError)>,
}

impl RunSummary {
    /// Unreachable URLs are reported in the result files, not in the exit code.
    /// Only a sitemap that could not be processed at all fails the run.
    pub fn exit_code(&self) -> ExitCode {
        if self.errors.is_empty() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}
// endregion

fn write_banner<P: Write>(progress: &mut P, text: &str) -> Result<(), CheckError> {
    progress
        .write_all(text.as_bytes())
        .and_then(|()| progress.flush())
        .map_err(CheckError::Progress)
}

/// Checks every URL of one sitemap and writes its result file.
///
/// The result file is created before the sitemap is parsed, so a malformed sitemap still
/// leaves an empty result file behind. The file is closed on every exit path.
///
/// # Arguments
///
/// * `client` - A shared, configured HTTP client.
/// * `settings` - Resolved settings: base and output directories, concurrency, redirects.
/// * `sitemap` - The sitemap argument exactly as given on the command line.
/// * `progress` - Sink for the banners and the `.`/`X` markers, usually stdout.
///
/// # Returns
///
/// A [`Summary`] with the result file path and the number of checked and failed URLs.
///
/// # Errors
///
/// - [`CheckError::ResultFile`] if the result file cannot be created.
/// - [`CheckError::Sitemap`] if the sitemap cannot be opened or parsed.
/// - [`CheckError::Report`] or [`CheckError::Progress`] if writing the output fails.
pub async fn check_sitemap<P: Write>(
    client: &reqwest::Client,
    settings: &Settings,
    sitemap: &str,
    progress: &mut P,
) -> Result<Summary, CheckError> {
    let result_path = utils::result_file_path(&settings.output_dir, sitemap);

    write_banner(
        progress,
        &format!(
            "\r\n{SEPARATOR}\n{}\n",
            style(format!("Processing [{sitemap}]")).bold()
        ),
    )?;

    if let Some(parent) = result_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| CheckError::ResultFile {
            path: result_path.clone(),
            source,
        })?;
    }
    let result_file = File::create(&result_path).map_err(|source| CheckError::ResultFile {
        path: result_path.clone(),
        source,
    })?;

    let sitemap_path = utils::resolve_sitemap_path(&settings.base_dir, sitemap);
    let urls = read_locations(&sitemap_path)?;
    tracing::info!(sitemap, urls = urls.len(), "checking sitemap");

    let mut writer = ReportWriter::new(&mut *progress, BufWriter::new(result_file));
    let mut outcomes = stream::iter(urls.iter())
        .map(|url| network::verify(client, url, settings.max_redirects))
        .buffered(settings.concurrency_limit);

    while let Some(outcome) = outcomes.next().await {
        tracing::debug!(
            url = %outcome.requested_url,
            status = %outcome.status_code,
            reachable = outcome.reachable,
            "verified"
        );
        writer
            .record(&outcome)
            .map_err(|source| CheckError::Report {
                path: result_path.clone(),
                source,
            })?;
    }

    let tally = writer.finish().map_err(|source| CheckError::Report {
        path: result_path.clone(),
        source,
    })?;

    write_banner(
        progress,
        &format!(
            "\r\n\r\nResults written to: {}\n{SEPARATOR}\r\n\n",
            style(result_path.display()).underlined().cyan()
        ),
    )?;

    Ok(Summary {
        sitemap: sitemap.to_string(),
        result_path,
        checked: tally.checked,
        failed: tally.failed,
    })
}

/// Checks every sitemap argument in the order given.
///
/// A sitemap that cannot be processed is reported on stderr and skipped; the remaining
/// arguments are still checked.
///
/// # Returns
///
/// A [`RunSummary`] listing the completed sitemaps and the errors of the skipped ones.
pub async fn run<P: Write>(
    client: &reqwest::Client,
    settings: &Settings,
    progress: &mut P,
) -> RunSummary {
    let mut summary = RunSummary::default();

    for sitemap in &settings.sitemaps {
        match check_sitemap(client, settings, sitemap, progress).await {
            Ok(result) => {
                tracing::info!(
                    sitemap,
                    checked = result.checked,
                    failed = result.failed,
                    "sitemap done"
                );
                summary.completed.push(result);
            }
            Err(e) => {
                tracing::error!(sitemap, error = %e, "sitemap aborted");
                eprintln!("\n{} {}: {}", style("[ERROR]").red(), sitemap, e);
                summary.errors.push((sitemap.clone(), e));
            }
        }
    }

    summary
}
