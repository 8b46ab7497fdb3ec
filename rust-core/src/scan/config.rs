//! Scan configuration and validation

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::affinity::{available_processors, AffinityPolicy, NoAffinity, PinToProcessor};
use super::BAND_GUARD_HZ;
use crate::filters::{ConvolutionMethod, KernelSettings, WindowType};

/// Multiplier over the mean band power above which a band is flagged
pub const DEFAULT_THRESHOLD: f64 = 2.0;

/// Lower edge of the default window of interest (Hz)
pub const DEFAULT_WINDOW_LOW: f64 = 50_000.0;

/// Upper edge of the default window of interest (Hz)
pub const DEFAULT_WINDOW_HIGH: f64 = 150_000.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Sampling rate must be positive and finite (got {0})")]
    SampleRate(f64),

    #[error("Filter order must be even and positive (got {0})")]
    FilterOrder(usize),

    #[error("Number of bands must be at least 1")]
    NoBands,

    #[error("Bands of {bandwidth} Hz leave no passband inside the {guard} Hz edge guards")]
    BandTooNarrow { bandwidth: f64, guard: f64 },

    #[error("Number of threads must be at least 1")]
    NoThreads,

    #[error("Number of processors must be at least 1")]
    NoProcessors,

    #[error("Threshold must be a finite non-negative multiplier (got {0})")]
    Threshold(f64),

    #[error("Window of interest [{low}, {high}] Hz is empty")]
    Window { low: f64, high: f64 },
}

/// What happens when a worker cannot be pinned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AffinityMode {
    /// Binding failure aborts the scan
    #[default]
    Strict,

    /// Binding failure is logged and the worker runs unpinned
    Relaxed,

    /// Workers are never pinned
    Disabled,
}

impl fmt::Display for AffinityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AffinityMode::Strict => f.write_str("strict"),
            AffinityMode::Relaxed => f.write_str("relaxed"),
            AffinityMode::Disabled => f.write_str("disabled"),
        }
    }
}

impl FromStr for AffinityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(AffinityMode::Strict),
            "relaxed" => Ok(AffinityMode::Relaxed),
            "disabled" | "none" | "off" => Ok(AffinityMode::Disabled),
            other => Err(format!("unknown affinity mode '{}'", other)),
        }
    }
}

/// Scan configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Sampling rate Fs in Hz
    pub sample_rate: f64,

    /// FIR order (taps = order + 1), even
    pub filter_order: usize,

    /// Number of equal-width bands across [0, Fs/2]
    pub num_bands: usize,

    /// Number of worker threads
    pub num_threads: usize,

    /// Number of processors workers are spread over
    pub num_processors: usize,

    /// Flag bands above `threshold * mean power`
    pub threshold: f64,

    /// Window of interest, lower edge (Hz)
    pub window_low: f64,

    /// Window of interest, upper edge (Hz)
    pub window_high: f64,

    /// Taper applied to each band filter
    pub window_type: WindowType,

    /// Convolution kernel
    pub method: ConvolutionMethod,

    pub affinity: AffinityMode,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sample_rate: 1_000_000.0,
            filter_order: 32,
            num_bands: 64,
            num_threads: 1,
            num_processors: available_processors(),
            threshold: DEFAULT_THRESHOLD,
            window_low: DEFAULT_WINDOW_LOW,
            window_high: DEFAULT_WINDOW_HIGH,
            window_type: WindowType::Hamming,
            method: ConvolutionMethod::Direct,
            affinity: AffinityMode::Strict,
        }
    }
}

impl ScanConfig {
    /// Check every parameter before any work starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::SampleRate(self.sample_rate));
        }
        if self.filter_order == 0 || self.filter_order % 2 != 0 {
            return Err(ConfigError::FilterOrder(self.filter_order));
        }
        if self.num_bands == 0 {
            return Err(ConfigError::NoBands);
        }
        let bandwidth = self.sample_rate / 2.0 / self.num_bands as f64;
        if bandwidth <= 2.0 * BAND_GUARD_HZ {
            return Err(ConfigError::BandTooNarrow {
                bandwidth,
                guard: BAND_GUARD_HZ,
            });
        }
        if self.num_threads == 0 {
            return Err(ConfigError::NoThreads);
        }
        if self.num_processors == 0 {
            return Err(ConfigError::NoProcessors);
        }
        if !(self.threshold.is_finite() && self.threshold >= 0.0) {
            return Err(ConfigError::Threshold(self.threshold));
        }
        if !(self.window_low <= self.window_high) {
            return Err(ConfigError::Window {
                low: self.window_low,
                high: self.window_high,
            });
        }
        Ok(())
    }

    /// Filter settings shared by all bands
    pub fn kernel(&self) -> KernelSettings {
        KernelSettings {
            filter_order: self.filter_order,
            sample_rate: self.sample_rate,
            window_type: self.window_type,
            method: self.method,
        }
    }

    /// Affinity policy selected by `affinity`
    pub fn affinity_policy(&self) -> Box<dyn AffinityPolicy> {
        match self.affinity {
            AffinityMode::Strict => Box::new(PinToProcessor::strict(self.num_processors)),
            AffinityMode::Relaxed => Box::new(PinToProcessor::relaxed(self.num_processors)),
            AffinityMode::Disabled => Box::new(NoAffinity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(ScanConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let base = ScanConfig::default();

        let cases = [
            (ScanConfig { sample_rate: 0.0, ..base.clone() }, ConfigError::SampleRate(0.0)),
            (ScanConfig { filter_order: 0, ..base.clone() }, ConfigError::FilterOrder(0)),
            (ScanConfig { filter_order: 33, ..base.clone() }, ConfigError::FilterOrder(33)),
            (ScanConfig { num_bands: 0, ..base.clone() }, ConfigError::NoBands),
            (ScanConfig { num_threads: 0, ..base.clone() }, ConfigError::NoThreads),
            (ScanConfig { num_processors: 0, ..base.clone() }, ConfigError::NoProcessors),
            (ScanConfig { threshold: -1.0, ..base.clone() }, ConfigError::Threshold(-1.0)),
            (
                ScanConfig { window_low: 2.0, window_high: 1.0, ..base.clone() },
                ConfigError::Window { low: 2.0, high: 1.0 },
            ),
        ];

        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }

        let nan_rate = ScanConfig { sample_rate: f64::NAN, ..base };
        assert!(matches!(nan_rate.validate(), Err(ConfigError::SampleRate(_))));
    }

    #[test]
    fn test_bands_narrower_than_guards_rejected() {
        let config = ScanConfig {
            sample_rate: 1.0,
            filter_order: 8,
            num_bands: 5000,
            affinity: AffinityMode::Disabled,
            ..ScanConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::BandTooNarrow {
                bandwidth: 0.0001,
                guard: BAND_GUARD_HZ,
            })
        );

        // Just wide enough for a positive passband
        let narrow = ScanConfig { num_bands: 2000, ..config };
        assert_eq!(narrow.validate(), Ok(()));
        let edges = crate::scan::BandPlan::new(narrow.sample_rate, narrow.num_bands).edges(1999);
        assert!(edges.low_hz < edges.high_hz);
    }

    #[test]
    fn test_affinity_mode_parsing() {
        assert_eq!("Relaxed".parse::<AffinityMode>().unwrap(), AffinityMode::Relaxed);
        assert_eq!("off".parse::<AffinityMode>().unwrap(), AffinityMode::Disabled);
        assert!("sometimes".parse::<AffinityMode>().is_err());
    }

    #[test]
    fn test_policy_follows_mode() {
        let config = ScanConfig {
            num_processors: 4,
            affinity: AffinityMode::Strict,
            ..ScanConfig::default()
        };
        assert_eq!(config.affinity_policy().processor_for(6), Some(2));

        let disabled = ScanConfig { affinity: AffinityMode::Disabled, ..config };
        assert_eq!(disabled.affinity_policy().processor_for(6), None);
    }
}
