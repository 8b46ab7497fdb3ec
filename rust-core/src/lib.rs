//! Band Scan - Parallel Band-Pass Anomaly Scanner
//! 
//! Splits a signal's spectrum into equal bands, measures each band's power
//! with a windowed FIR filter on a pinned worker pool, and flags bands that
//! stand out inside a window of interest.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![allow(non_local_definitions)]

pub mod args;
pub mod filters;
pub mod scan;
pub mod signal;
#[cfg(feature = "python")]
pub mod python_bindings;

pub use filters::{WindowType, compute_band_power};
pub use scan::{run_scan, AnalysisContext, ScanConfig, ScanVerdict};
pub use signal::{Signal, SignalFormat};
