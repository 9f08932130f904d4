use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Log directive used when `RUST_LOG` is not set.
pub fn default_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("sitecheck={level}")
}

/// Initialize structured logging on stderr.
///
/// Stdout is reserved for banners and progress markers, so logs never go there.
/// `RUST_LOG` takes precedence over the `-v` count.
pub fn init_logging(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();

    tracing::debug!(verbosity, "logging initialized");
}
