//! Logger builder implementation

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::{Config, Format, Writer};
use crate::error::{LogError, LogResult};

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

/// Guard returned by [`LoggerBuilder::build`]
///
/// The subscriber is process-global; the guard records what was installed.
#[derive(Debug)]
pub struct LoggerGuard {
    filter: String,
    format: Format,
}

impl LoggerGuard {
    /// Filter directive the subscriber was installed with
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Output format the subscriber was installed with
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }
}

/// Apply the display options shared by every format and box the result.
/// The two branches differ only in the timer type, hence the macro.
macro_rules! boxed_fmt_layer {
    ($layer:expr, $config:expr, $filter:expr) => {{
        let layer = $layer
            .with_writer(make_writer($config.writer))
            .with_ansi($config.colors)
            .with_target($config.target);
        if $config.time {
            layer.with_filter($filter).boxed()
        } else {
            layer.without_time().with_filter($filter).boxed()
        }
    }};
}

fn make_writer(writer: Writer) -> BoxMakeWriter {
    match writer {
        Writer::Stderr => BoxMakeWriter::new(std::io::stderr),
        Writer::Stdout => BoxMakeWriter::new(std::io::stdout),
    }
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Parse the filter directive without installing anything
    pub fn filter(&self) -> LogResult<EnvFilter> {
        EnvFilter::try_new(&self.config.level)
            .map_err(|e| LogError::Filter(format!("{}: {}", &self.config.level, e)))
    }

    /// Build and initialize the logger
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Filter string cannot be parsed
    /// - A global subscriber is already installed
    pub fn build(self) -> LogResult<LoggerGuard> {
        let filter = self.filter()?;
        let config = &self.config;

        let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
            Format::Pretty => boxed_fmt_layer!(fmt::layer().pretty(), config, filter),
            Format::Compact => boxed_fmt_layer!(fmt::layer().compact(), config, filter),
            Format::Json => boxed_fmt_layer!(fmt::layer().json(), config, filter),
        };

        Registry::default()
            .with(layer)
            .try_init()
            .map_err(|e| LogError::AlreadyInitialized(e.to_string()))?;

        Ok(LoggerGuard {
            filter: self.config.level,
            format: self.config.format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filter_is_rejected_before_install() {
        let builder = LoggerBuilder::from_config(Config::default().with_level("kernsim=loudest"));
        let err = builder.build().unwrap_err();
        assert_eq!(err.code(), "LOG:CONFIG:FILTER");
    }

    #[test]
    fn valid_filter_parses() {
        let builder =
            LoggerBuilder::from_config(Config::default().with_level("kernsim_device=debug,info"));
        assert!(builder.filter().is_ok());
    }
}
