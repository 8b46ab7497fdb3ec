//! Anomaly detection over the completed band power table

use super::config::ScanConfig;
use super::BandPlan;
use crate::filters::BandEdges;
use crate::signal::{max_of, mean};

/// One row of the scan result
#[derive(Debug, Clone, PartialEq)]
pub struct BandReport {
    pub band: usize,
    pub edges: BandEdges,
    pub power: f64,

    /// Band intersects the window of interest
    pub in_window: bool,

    /// In the window and above the threshold
    pub flagged: bool,
}

/// Frequency envelope spanning every flagged band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl Detection {
    pub fn center_hz(&self) -> f64 {
        (self.low_hz + self.high_hz) / 2.0
    }
}

/// Result of analyzing all band powers
#[derive(Debug, Clone, PartialEq)]
pub struct ScanVerdict {
    pub bands: Vec<BandReport>,
    pub max_power: f64,
    pub avg_power: f64,
    pub detection: Option<Detection>,
}

impl ScanVerdict {
    pub fn is_anomalous(&self) -> bool {
        self.detection.is_some()
    }

    /// `(low, high)` envelope of flagged bands
    pub fn envelope(&self) -> Option<(f64, f64)> {
        self.detection.map(|d| (d.low_hz, d.high_hz))
    }

    pub fn powers(&self) -> Vec<f64> {
        self.bands.iter().map(|b| b.power).collect()
    }

    pub fn flagged_bands(&self) -> impl Iterator<Item = &BandReport> {
        self.bands.iter().filter(|b| b.flagged)
    }
}

/// Flags bands inside `[window_low, window_high]` whose power exceeds
/// `threshold` times the mean power over all bands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyAnalyzer {
    pub threshold: f64,
    pub window_low: f64,
    pub window_high: f64,
}

impl AnomalyAnalyzer {
    pub fn new(threshold: f64, window_low: f64, window_high: f64) -> Self {
        Self {
            threshold,
            window_low,
            window_high,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.threshold, config.window_low, config.window_high)
    }

    /// Single pass over `powers`, which must hold one entry per band of `plan`
    pub fn analyze(&self, plan: &BandPlan, powers: &[f64]) -> ScanVerdict {
        debug_assert_eq!(powers.len(), plan.num_bands());

        let max_power = max_of(powers).unwrap_or(0.0);
        let avg_power = mean(powers);
        let limit = self.threshold * avg_power;

        let mut detection: Option<Detection> = None;
        let mut bands = Vec::with_capacity(powers.len());

        for (band, &power) in powers.iter().enumerate() {
            let edges = plan.edges(band);
            let in_window = edges.intersects(self.window_low, self.window_high);
            let flagged = in_window && power > limit;

            if flagged {
                detection = Some(match detection {
                    Some(d) => Detection {
                        low_hz: d.low_hz,
                        high_hz: edges.high_hz,
                    },
                    None => Detection {
                        low_hz: edges.low_hz,
                        high_hz: edges.high_hz,
                    },
                });
            }

            bands.push(BandReport {
                band,
                edges,
                power,
                in_window,
                flagged,
            });
        }

        ScanVerdict {
            bands,
            max_power,
            avg_power,
            detection,
        }
    }
}
