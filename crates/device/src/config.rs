//! Device configuration

use std::time::Duration;

use crate::error::{DeviceError, DeviceResult};

/// Maximum number of pending requests by default
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Maps a payload size to a simulated processing delay
///
/// The delay is `per_kib` for every whole KiB of payload, so it is
/// monotonic in the payload size and sub-KiB payloads complete instantly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyModel {
    per_kib: Duration,
}

impl Default for LatencyModel {
    fn default() -> Self {
        Self::per_kib(Duration::from_millis(1))
    }
}

impl LatencyModel {
    #[must_use]
    pub const fn per_kib(per_kib: Duration) -> Self {
        Self { per_kib }
    }

    /// No delay at all
    #[must_use]
    pub const fn instant() -> Self {
        Self::per_kib(Duration::ZERO)
    }

    /// Simulated delay for a payload of `payload_size` bytes
    #[must_use]
    pub fn delay_for(&self, payload_size: usize) -> Duration {
        let kib = u32::try_from(payload_size / 1024).unwrap_or(u32::MAX);
        self.per_kib.saturating_mul(kib)
    }
}

/// Configuration for the device driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Pending requests beyond this are rejected
    pub queue_capacity: usize,
    /// Simulated processing latency
    pub latency: LatencyModel,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            latency: LatencyModel::default(),
        }
    }
}

impl DeviceConfig {
    /// Zero-latency configuration, handy in tests
    #[must_use]
    pub fn instant() -> Self {
        Self {
            latency: LatencyModel::instant(),
            ..Self::default()
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_latency(mut self, latency: LatencyModel) -> Self {
        self.latency = latency;
        self
    }

    pub fn validate(&self) -> DeviceResult<()> {
        if self.queue_capacity == 0 {
            return Err(DeviceError::invalid_config(
                "queue capacity must be non-zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0)]
    #[case(1023, 0)]
    #[case(1024, 1)]
    #[case(4096, 4)]
    #[case(4097, 4)]
    fn one_millisecond_per_whole_kib(#[case] payload: usize, #[case] millis: u64) {
        assert_eq!(
            LatencyModel::default().delay_for(payload),
            Duration::from_millis(millis)
        );
    }

    #[test]
    fn delay_is_monotonic_up_to_usize_max() {
        let model = LatencyModel::per_kib(Duration::from_secs(1));
        assert!(model.delay_for(usize::MAX) >= model.delay_for(usize::MAX / 2));
        assert!(model.delay_for(usize::MAX / 2) >= model.delay_for(1 << 20));
    }

    #[test]
    fn instant_never_sleeps() {
        assert_eq!(LatencyModel::instant().delay_for(1 << 30), Duration::ZERO);
    }

    #[test]
    fn validation() {
        assert!(DeviceConfig::default().validate().is_ok());
        assert_eq!(DeviceConfig::default().queue_capacity, 100);
        assert!(
            DeviceConfig::default()
                .with_queue_capacity(0)
                .validate()
                .is_err()
        );
    }
}
