//! Common CLI flags for logging.

use std::io;

use tracing_subscriber::{EnvFilter, fmt::writer::BoxMakeWriter};

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("invalid log filter {directive:?}: {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("failed to install the global subscriber: {0}")]
    Install(Box<dyn std::error::Error + Send + Sync>),
}

/// CLI config for the logging related subset of options.
#[derive(Debug, Clone, clap::Parser)]
pub(crate) struct LoggingConfig {
    /// Logs: filter directive
    ///
    /// Configures log severity level filter, by target.
    ///
    /// Simplest options: error, warn, info, debug, trace
    ///
    /// Levels for different modules can be specified. For example
    /// `debug,dictcodec::store=info` specifies debug logging for everything
    /// except the store, which only logs at info level.
    ///
    /// Overridden by `-v`.
    #[clap(long = "log-filter", env = "LOG_FILTER", global = true)]
    pub(crate) log_filter: Option<String>,

    /// Logs: filter short-hand
    ///
    /// Convenient way to set log severity level filter.
    /// Overrides `--log-filter`.
    ///
    /// -v   'info'
    ///
    /// -vv  'debug'
    ///
    /// -vvv 'trace'
    #[clap(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        verbatim_doc_comment
    )]
    pub(crate) log_verbose_count: u8,

    /// Logs: destination
    #[clap(
        value_enum,
        long = "log-destination",
        env = "LOG_DESTINATION",
        default_value_t = LogDestination::Stderr,
        global = true
    )]
    pub(crate) log_destination: LogDestination,

    /// Logs: message format
    ///
    /// full: human-readable, single line
    ///
    /// pretty: human-readable, multi line
    ///
    /// json: machine-parseable
    #[clap(
        value_enum,
        long = "log-format",
        env = "LOG_FORMAT",
        default_value_t = LogFormat::Full,
        global = true,
        verbatim_doc_comment
    )]
    pub(crate) log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum LogDestination {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Full,
    Pretty,
    Json,
}

impl LoggingConfig {
    pub(crate) const DEFAULT_LOG_FILTER: &'static str = "warn";

    /// The filter directive in effect. `-v` wins over `--log-filter`.
    pub(crate) fn directive(&self) -> &str {
        match self.log_verbose_count {
            0 => self
                .log_filter
                .as_deref()
                .unwrap_or(Self::DEFAULT_LOG_FILTER),
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    pub(crate) fn install_global_subscriber(&self) -> Result<(), Error> {
        let directive = self.directive();
        let filter = EnvFilter::try_new(directive).map_err(|source| Error::InvalidFilter {
            directive: directive.to_string(),
            source,
        })?;

        let writer = match self.log_destination {
            LogDestination::Stdout => BoxMakeWriter::new(io::stdout),
            LogDestination::Stderr => BoxMakeWriter::new(io::stderr),
        };

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer);
        match self.log_format {
            LogFormat::Full => builder.try_init(),
            LogFormat::Pretty => builder.pretty().try_init(),
            LogFormat::Json => builder.json().try_init(),
        }
        .map_err(Error::Install)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn parse(args: &[&str]) -> LoggingConfig {
        LoggingConfig::try_parse_from(std::iter::once("dictcodec").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn default_filter() {
        let config = parse(&[]);
        assert_eq!(config.directive(), LoggingConfig::DEFAULT_LOG_FILTER);
        assert_eq!(config.log_destination, LogDestination::Stderr);
        assert_eq!(config.log_format, LogFormat::Full);
    }

    #[test]
    fn verbose_overrides_filter() {
        assert_eq!(parse(&["--log-filter", "error"]).directive(), "error");
        assert_eq!(parse(&["--log-filter", "error", "-v"]).directive(), "info");
        assert_eq!(parse(&["-vv"]).directive(), "debug");
        assert_eq!(parse(&["-vvvv"]).directive(), "trace");
    }

    #[test]
    fn formats_and_destinations() {
        let config = parse(&["--log-format", "json", "--log-destination", "stdout"]);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_destination, LogDestination::Stdout);

        assert!(
            LoggingConfig::try_parse_from(["dictcodec", "--log-format", "logfmt"]).is_err()
        );
    }
}
