use crate::network::FinalResponse;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Failure to turn a sitemap file into its list of `<loc>` URLs.
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("cannot open sitemap `{}`: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read sitemap: {source}")]
    Read {
        #[source]
        source: Arc<io::Error>,
    },

    /// The document is not well-formed XML.
    #[error("malformed sitemap at byte {position}: {reason}")]
    Malformed { position: u64, reason: String },
}

impl SitemapError {
    pub(crate) fn from_xml(error: quick_xml::Error, position: u64) -> Self {
        match error {
            quick_xml::Error::Io(source) => SitemapError::Read { source },
            other => SitemapError::Malformed {
                position,
                reason: other.to_string(),
            },
        }
    }
}

/// Failure while requesting a single URL. Recovered per URL, never fatal for a sitemap.
///
/// `last` carries the last response obtained before the failure (an earlier redirect hop),
/// so the caller can still report something meaningful.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request failed: {source}")]
    Network {
        #[source]
        source: reqwest::Error,
        last: Option<FinalResponse>,
    },

    #[error("more than {max_hops} redirects")]
    TooManyRedirects {
        max_hops: usize,
        last: Option<FinalResponse>,
    },
}

impl FetchError {
    /// The last response obtained before the request chain failed, if any.
    pub fn last_response(&self) -> Option<&FinalResponse> {
        match self {
            FetchError::InvalidUrl { .. } => None,
            FetchError::Network { last, .. } | FetchError::TooManyRedirects { last, .. } => {
                last.as_ref()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot write progress marker: {0}")]
    Progress(#[source] io::Error),

    #[error("cannot write report line: {0}")]
    Report(#[source] io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read config file `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file `{}`: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("cannot determine the directory of the executable: {0}")]
    BaseDir(#[source] io::Error),
}

/// Failure scoped to one sitemap argument. Aborts that sitemap, never the others.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Sitemap(#[from] SitemapError),

    #[error("cannot create result file `{}`: {source}", path.display())]
    ResultFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write results for `{}`: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: ReportError,
    },

    #[error("cannot write progress output: {0}")]
    Progress(#[source] io::Error),
}
