//! Logger configuration and presets

use core::str::FromStr;

use crate::error::LogError;

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Multi-line, human oriented
    Pretty,
    /// Single line per event
    #[default]
    Compact,
    /// Newline-delimited JSON
    Json,
}

impl FromStr for Format {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(LogError::Filter(format!("unknown log format `{other}`"))),
        }
    }
}

/// Destination of formatted events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Writer {
    /// Write to stderr
    #[default]
    Stderr,
    /// Write to stdout
    Stdout,
}

/// Logger configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `EnvFilter` directive, e.g. `info` or `kernsim_device=debug,info`
    pub level: String,
    /// Output format
    pub format: Format,
    /// ANSI colors
    pub colors: bool,
    /// Timestamp on every line
    pub time: bool,
    /// Print the event target (module path)
    pub target: bool,
    /// Output stream
    pub writer: Writer,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Compact,
            colors: true,
            time: true,
            target: false,
            writer: Writer::Stderr,
        }
    }
}

impl Config {
    /// Create configuration from environment variables
    ///
    /// `KERNSIM_LOG` wins over `RUST_LOG`; `KERNSIM_LOG_FORMAT` selects the
    /// format and falls back to compact when unrecognised.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("KERNSIM_LOG") {
            config.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            config.level = level;
        }

        if let Ok(format) = std::env::var("KERNSIM_LOG_FORMAT") {
            config.format = format.parse().unwrap_or_default();
        }

        config
    }

    /// Development configuration (pretty, debug level)
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: Format::Pretty,
            target: true,
            ..Self::default()
        }
    }

    /// Production configuration (JSON, info level)
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Json,
            colors: false,
            ..Self::default()
        }
    }

    /// Test configuration (everything, no colors or timestamps)
    #[must_use]
    pub fn test() -> Self {
        Self {
            level: "trace".to_string(),
            format: Format::Compact,
            colors: false,
            time: false,
            ..Self::default()
        }
    }

    /// Override the filter directive
    #[must_use = "builder methods must be chained or built"]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Override the output format
    #[must_use = "builder methods must be chained or built"]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_writer(mut self, writer: Writer) -> Self {
        self.writer = writer;
        self
    }
}
