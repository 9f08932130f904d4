use crate::error::ConfigError;
use crate::utils;
use clap::{ArgAction, Parser, ValueHint, value_parser};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default values used throughout the project.
pub mod defaults {
    /// Number of requests in flight per sitemap. One keeps the checks strictly sequential.
    pub const CONCURRENCY: u8 = 1;

    /// Maximum number of redirect hops followed for a single URL.
    pub const MAX_REDIRECTS: u8 = 10;

    /// The default user agent header value used for network requests.
    pub const USER_AGENT: &str = concat!(
        "Mozilla/5.0 (compatible; Sitecheck/",
        env!("CARGO_PKG_VERSION"),
        ")"
    );

    /// Config file picked up from the working directory when `--config` is not given.
    pub const CONFIG_FILE: &str = ".sitecheck.toml";
}

fn validate_output_dir_str(s: &str) -> Result<PathBuf, String> {
    let path = utils::expand_path(s);
    if path.exists() && !path.is_dir() {
        Err(format!(
            "❌ The output path '{}' is not a directory.",
            path.display()
        ))
    } else {
        Ok(path)
    }
}

fn validate_base_dir_str(s: &str) -> Result<PathBuf, String> {
    let path = utils::expand_path(s);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!(
            "❌ The base directory '{}' does not exist or is not a directory.",
            path.display()
        ))
    }
}

fn parse_config_path(s: &str) -> Result<PathBuf, String> {
    Ok(utils::expand_path(s))
}

#[derive(Debug, Parser)]
#[command(version, about, term_width = 80)]
pub struct Cli {
    #[arg(
        required = true,
        help = "One or more sitemap files to check. Relative paths are resolved against the base directory.",
        value_hint = ValueHint::FilePath
    )]
    pub sitemaps: Vec<String>,

    #[arg(
        short = 'b',
        long,
        help = "Directory the sitemap paths are resolved against [default: the directory of this executable]",
        value_hint = ValueHint::DirPath,
        value_parser = validate_base_dir_str
    )]
    pub base_dir: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        help = "Directory where the `<sitemap>_results.txt` files are written [default: current directory]",
        value_hint = ValueHint::DirPath,
        value_parser = validate_output_dir_str
    )]
    pub output_dir: Option<PathBuf>,

    #[arg(
        short = 'c',
        long,
        help = "Maximum number of concurrent requests per sitemap. Output order is always the sitemap order [default: 1]",
        value_parser = value_parser!(u8).range(1..=100)
    )]
    pub concurrency_limit: Option<u8>,

    #[arg(
        short = 't',
        long,
        help = "Timeout (in seconds) for each request. Requests wait indefinitely when not set",
        value_parser = value_parser!(u64).range(1..=3600)
    )]
    pub request_timeout: Option<u64>,

    #[arg(
        long,
        help = "Maximum number of redirects followed for a single URL [default: 10]",
        value_parser = value_parser!(u8).range(0..=50)
    )]
    pub max_redirects: Option<u8>,

    #[arg(long, help = "Custom User-Agent header to be used in requests")]
    pub user_agent: Option<String>,

    #[arg(
        long,
        help = "Path to a TOML config file [default: .sitecheck.toml in the current directory, if present]",
        value_hint = ValueHint::FilePath,
        value_parser = parse_config_path
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'v',
        long,
        action = ArgAction::Count,
        help = "Increase log verbosity on stderr (-v info, -vv debug, -vvv trace)"
    )]
    pub verbose: u8,
}

/// Values read from a TOML config file. Every key is optional; CLI arguments win.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub base_dir: Option<String>,
    pub output_dir: Option<String>,
    pub concurrency_limit: Option<u8>,
    pub request_timeout: Option<u64>,
    pub max_redirects: Option<u8>,
    pub user_agent: Option<String>,
}

impl ConfigFile {
    /// Loads the config file.
    ///
    /// An explicit `path` must exist. Without one, `.sitecheck.toml` in the current
    /// directory is used when present, otherwise an empty config is returned.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) if path.is_file() => path.to_path_buf(),
            Some(path) => return Err(ConfigError::NotFound(path.to_path_buf())),
            None => {
                let fallback = PathBuf::from(defaults::CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }
}

/// Fully resolved settings the checker runs with.
#[derive(Debug, Clone)]
pub struct Settings {
    pub sitemaps: Vec<String>,
    pub base_dir: PathBuf,
    pub output_dir: PathBuf,
    pub concurrency_limit: usize,
    pub request_timeout: Option<Duration>,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Cli {
    /// Fills every option not given on the command line from the config file.
    pub fn apply_config(&mut self, config: &ConfigFile) {
        if self.base_dir.is_none() {
            self.base_dir = config.base_dir.as_deref().map(utils::expand_path);
        }
        if self.output_dir.is_none() {
            self.output_dir = config.output_dir.as_deref().map(utils::expand_path);
        }
        self.concurrency_limit = self.concurrency_limit.or(config.concurrency_limit);
        self.request_timeout = self.request_timeout.or(config.request_timeout);
        self.max_redirects = self.max_redirects.or(config.max_redirects);
        if self.user_agent.is_none() {
            self.user_agent = config.user_agent.clone();
        }
    }

    /// Resolves the remaining defaults. Config file values are validated here since
    /// they never went through the clap value parsers.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let concurrency_limit = self.concurrency_limit.unwrap_or(defaults::CONCURRENCY);
        if !(1..=100).contains(&concurrency_limit) {
            return Err(ConfigError::Invalid {
                key: "concurrency_limit",
                reason: format!("{concurrency_limit} is not in 1..=100"),
            });
        }

        let max_redirects = self.max_redirects.unwrap_or(defaults::MAX_REDIRECTS);
        if max_redirects > 50 {
            return Err(ConfigError::Invalid {
                key: "max_redirects",
                reason: format!("{max_redirects} is not in 0..=50"),
            });
        }

        let request_timeout = match self.request_timeout {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    key: "request_timeout",
                    reason: "must be at least 1 second".to_string(),
                });
            }
            timeout => timeout.map(Duration::from_secs),
        };

        let base_dir = match &self.base_dir {
            Some(dir) => dir.clone(),
            None => utils::executable_dir().map_err(ConfigError::BaseDir)?,
        };

        Ok(Settings {
            sitemaps: self.sitemaps.clone(),
            base_dir,
            output_dir: self.output_dir.clone().unwrap_or_default(),
            concurrency_limit: usize::from(concurrency_limit),
            request_timeout,
            max_redirects: usize::from(max_redirects),
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| defaults::USER_AGENT.to_string()),
        })
    }
}
