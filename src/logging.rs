use std::io::IsTerminal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_FORMAT_ENV: &str = "AUTOWITHDRAW_LOG_JSON";
const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `"1"` selects JSON lines; anything else, or nothing, is pretty output.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag.map(str::trim) {
            Some("1") => Self::Json,
            _ => Self::Pretty,
        }
    }

    fn from_env() -> Self {
        Self::from_flag(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }
}

/// Installs the global subscriber on stderr; stdout carries the CSV output.
///
/// Filtering follows `RUST_LOG`. Calling this twice is harmless.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let format = LogFormat::from_env();

    let json = (format == LogFormat::Json)
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let pretty = (format == LogFormat::Pretty).then(|| {
        fmt::layer()
            .pretty()
            .with_ansi(std::io::stderr().is_terminal())
            .with_writer(std::io::stderr)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init();
}
