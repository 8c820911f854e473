//! Log levels

use core::fmt;
use core::str::FromStr;

use crate::error::LogError;

/// Severity of a log record, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Trace-level details (very verbose)
    Trace,
    /// Debug information
    Debug,
    /// Informational messages
    Info,
    /// Warnings (non-critical issues)
    Warn,
    /// Errors (critical issues)
    Error,
}

impl Level {
    /// Upper-case name as printed in log lines
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(LogError::InvalidLevel(s.to_string())),
        }
    }
}

impl From<Level> for tracing::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => Self::TRACE,
            Level::Debug => Self::DEBUG,
            Level::Info => Self::INFO,
            Level::Warn => Self::WARN,
            Level::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("trace", Level::Trace)]
    #[case("DEBUG", Level::Debug)]
    #[case(" info ", Level::Info)]
    #[case("warning", Level::Warn)]
    #[case("Warn", Level::Warn)]
    #[case("error", Level::Error)]
    fn parses_level_names(#[case] input: &str, #[case] expected: Level) {
        assert_eq!(input.parse::<Level>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_level() {
        let err = "loud".parse::<Level>().unwrap_err();
        assert!(matches!(err, LogError::InvalidLevel(ref s) if s == "loud"));
    }

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn display_is_upper_case() {
        assert_eq!(Level::Warn.to_string(), "WARN");
        assert_eq!(tracing::Level::from(Level::Error), tracing::Level::ERROR);
    }
}
