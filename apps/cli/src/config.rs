//! Layered application configuration
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file,
//! `KERNSIM_*` environment variables (`__` separates nesting levels, e.g.
//! `KERNSIM_POOL__CAPACITY`), then command-line flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use figment::Figment;
use figment::providers::{Env, Format as _, Serialized, Toml};
use kernsim_device::{DEFAULT_QUEUE_CAPACITY, DeviceConfig, LatencyModel};
use kernsim_memory::{CoalescePolicy, DEFAULT_POOL_CAPACITY, PoolConfig, REGION_OVERHEAD};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "kernsim.toml";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "KERNSIM_";

/// Merge direction on free, as spelled in config files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coalesce {
    Forward,
    #[default]
    Bidirectional,
}

impl From<Coalesce> for CoalescePolicy {
    fn from(value: Coalesce) -> Self {
        match value {
            Coalesce::Forward => Self::Forward,
            Coalesce::Bidirectional => Self::Bidirectional,
        }
    }
}

/// Log output format, as spelled in config files and flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormat> for kernsim_log::Format {
    fn from(value: LogFormat) -> Self {
        match value {
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
            LogFormat::Json => Self::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSection {
    pub capacity: usize,
    pub split_threshold: usize,
    pub coalesce: Coalesce,
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_POOL_CAPACITY,
            split_threshold: REGION_OVERHEAD,
            coalesce: Coalesce::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSection {
    pub queue_capacity: usize,
    pub latency_per_kib_ms: u64,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            latency_per_kib_ms: 1,
        }
    }
}

/// Unset fields fall back to `KERNSIM_LOG` / `RUST_LOG` / `KERNSIM_LOG_FORMAT`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<LogFormat>,
}

/// Fully resolved configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pool: PoolSection,
    pub device: DeviceSection,
    pub log: LogSection,
}

impl AppConfig {
    /// Resolve configuration for `cli`
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                if !path.is_file() {
                    bail!("config file not found: {}", path.display());
                }
                Some(path.clone())
            }
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
        };

        let mut config = Self::figment(file.as_deref())
            .extract::<Self>()
            .context("invalid configuration")?;
        config.apply_flags(cli);
        Ok(config)
    }

    /// Defaults, then the optional file, then the environment
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        // KERNSIM_LOG and KERNSIM_LOG_FORMAT belong to the logger, not the log table
        figment.merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["log", "log_format"])
                .split("__"),
        )
    }

    fn apply_flags(&mut self, cli: &Cli) {
        if let Some(capacity) = cli.pool_size {
            self.pool.capacity = capacity;
        }
        if let Some(capacity) = cli.queue_capacity {
            self.device.queue_capacity = capacity;
        }
        if let Some(level) = &cli.log_level {
            self.log.level = Some(level.clone());
        }
        if let Some(format) = cli.log_format {
            self.log.format = Some(format);
        }
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.pool.capacity)
            .with_split_threshold(self.pool.split_threshold)
            .with_coalesce(self.pool.coalesce.into())
    }

    pub fn device_config(&self) -> DeviceConfig {
        DeviceConfig::default()
            .with_queue_capacity(self.device.queue_capacity)
            .with_latency(LatencyModel::per_kib(Duration::from_millis(
                self.device.latency_per_kib_ms,
            )))
    }

    pub fn log_config(&self) -> kernsim_log::Config {
        let mut config = kernsim_log::Config::from_env();
        if let Some(level) = &self.log.level {
            config = config.with_level(level.clone());
        }
        if let Some(format) = self.log.format {
            config = config.with_format(format.into());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_library_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.pool_config(), PoolConfig::new(1_048_576));
        assert_eq!(config.device_config(), DeviceConfig::default());
    }

    #[test]
    fn file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                    [pool]
                    capacity = 4096
                    coalesce = "forward"

                    [device]
                    queue_capacity = 8
                "#,
            )?;
            jail.set_env("KERNSIM_DEVICE__QUEUE_CAPACITY", "16");
            jail.set_env("KERNSIM_LOG", "debug");

            let config: AppConfig = AppConfig::figment(Some(Path::new("custom.toml"))).extract()?;
            assert_eq!(config.pool.capacity, 4096);
            assert_eq!(config.pool.coalesce, Coalesce::Forward);
            assert_eq!(config.device.queue_capacity, 16);
            assert_eq!(config.log.level, None);
            Ok(())
        });
    }

    #[test]
    fn flags_win() {
        let cli = Cli {
            pool_size: Some(2048),
            queue_capacity: Some(3),
            log_format: Some(LogFormat::Json),
            ..Cli::default()
        };
        let mut config = AppConfig::default();
        config.apply_flags(&cli);

        assert_eq!(config.pool.capacity, 2048);
        assert_eq!(config.device_config().queue_capacity, 3);
        assert_eq!(config.log_config().format, kernsim_log::Format::Json);
    }
}
