//! Command-line flags

use std::path::PathBuf;

use clap::Parser;

use crate::config::LogFormat;

/// Kernel simulation: a pool allocator and a simulated block device
#[derive(Debug, Default, Parser)]
#[command(name = "kernsim")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run the built-in command sequence and exit
    #[arg(long)]
    pub test: bool,

    /// TOML config file (defaults to ./kernsim.toml when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Memory pool capacity in bytes
    #[arg(long, value_name = "BYTES")]
    pub pool_size: Option<usize>,

    /// Maximum number of pending device requests
    #[arg(long, value_name = "N")]
    pub queue_capacity: Option<usize>,

    /// Log filter directive, e.g. `info` or `kernsim_device=debug`
    #[arg(long, value_name = "DIRECTIVE")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::try_parse_from([
            "kernsim",
            "--test",
            "--pool-size",
            "4096",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert!(cli.test);
        assert_eq!(cli.pool_size, Some(4096));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert_eq!(cli.queue_capacity, None);
    }
}
