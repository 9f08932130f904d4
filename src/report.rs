use crate::error::ReportError;
use crate::network::FinalResponse;
use std::io::Write;

/// Indentation in front of every report line.
pub const INDENT: &str = "    ";

/// Status code recorded when no response was obtained at all.
pub const ERROR_STATUS: &str = "ERROR";

pub const REACHABLE_MARKER: &[u8] = b".";
pub const UNREACHABLE_MARKER: &[u8] = b"X";

/// Result of verifying a single sitemap URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub reachable: bool,
    pub status_code: String,
    pub final_url: String,
    pub requested_url: String,
}

impl Outcome {
    /// Only a plain `200` is reachable. A redirect keeps its 301/302 code and is reported.
    pub fn new(
        requested_url: impl Into<String>,
        status_code: impl Into<String>,
        final_url: impl Into<String>,
    ) -> Self {
        let status_code = status_code.into();
        Self {
            reachable: status_code == "200",
            status_code,
            final_url: final_url.into(),
            requested_url: requested_url.into(),
        }
    }

    pub fn from_response(requested_url: &str, response: &FinalResponse) -> Self {
        Self::new(
            requested_url,
            response.reported_status().as_u16().to_string(),
            response.url.as_str(),
        )
    }

    /// Outcome for a URL that never produced a response.
    pub fn error(requested_url: &str) -> Self {
        Self::new(requested_url, ERROR_STATUS, requested_url)
    }
}

/// Formats the report line for an unreachable outcome.
///
/// ```rust
/// use sitecheck::report::{Outcome, format_failure_line};
///
/// let outcome = Outcome::new("http://a.example/", "404", "http://a.example/");
/// assert_eq!(
///     format_failure_line(&outcome),
///     "    [404] http://a.example/ ==> http://a.example/\n"
/// );
/// ```
pub fn format_failure_line(outcome: &Outcome) -> String {
    format!(
        "{INDENT}[{}] {} ==> {}\n",
        outcome.status_code, outcome.requested_url, outcome.final_url
    )
}

/// Counters collected while writing one report.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub checked: usize,
    pub failed: usize,
}

/// Streams progress markers and failure lines for one sitemap.
///
/// The progress sink is flushed after every marker so it interleaves with the banners.
/// The report sink is flushed by [`ReportWriter::finish`], and closed when the writer drops.
pub struct ReportWriter<P: Write, R: Write> {
    progress: P,
    report: R,
    tally: Tally,
}

impl<P: Write, R: Write> ReportWriter<P, R> {
    /// Creates a writer over a progress sink (usually stdout) and a report sink
    /// (usually the buffered result file).
    pub fn new(progress: P, report: R) -> Self {
        Self {
            progress,
            report,
            tally: Tally::default(),
        }
    }

    /// Records one outcome: a marker on the progress sink, plus a failure line on the
    /// report sink when the URL is unreachable.
    ///
    /// # Errors
    ///
    /// [`ReportError::Progress`] or [`ReportError::Report`], depending on the sink that failed.
    pub fn record(&mut self, outcome: &Outcome) -> Result<(), ReportError> {
        self.tally.checked += 1;
        let marker = if outcome.reachable {
            REACHABLE_MARKER
        } else {
            UNREACHABLE_MARKER
        };
        self.progress
            .write_all(marker)
            .and_then(|()| self.progress.flush())
            .map_err(ReportError::Progress)?;

        if !outcome.reachable {
            self.tally.failed += 1;
            self.report
                .write_all(format_failure_line(outcome).as_bytes())
                .map_err(ReportError::Report)?;
        }
        Ok(())
    }

    /// Counters so far, before the writer is finished.
    pub fn tally(&self) -> Tally {
        self.tally
    }

    /// Flushes the report sink and returns the final counters.
    pub fn finish(mut self) -> Result<Tally, ReportError> {
        self.report.flush().map_err(ReportError::Report)?;
        Ok(self.tally)
    }
}
