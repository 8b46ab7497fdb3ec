//! Python bindings for the parallel band scan

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use numpy::{PyArray1, PyReadonlyArray1};
use crate::filters::ConvolutionMethod;
use crate::scan::{run_scan, AffinityMode, ScanConfig, ScanError};
use super::filter_bindings::PyWindowType;

fn to_py_err(e: ScanError) -> PyErr {
    match e {
        ScanError::Config(_) | ScanError::EmptySignal => PyValueError::new_err(e.to_string()),
        other => PyRuntimeError::new_err(other.to_string()),
    }
}

/// Band scanner exposed to Python
#[pyclass(name = "BandScanner")]
pub struct PyBandScanner {
    config: ScanConfig,
}

#[pymethods]
impl PyBandScanner {
    /// Create a new band scanner
    ///
    /// Args:
    ///     sample_rate: Sampling rate in Hz
    ///     filter_order: Even FIR order per band
    ///     num_bands: Number of equal-width bands across [0, sample_rate / 2]
    ///     num_threads: Worker threads
    ///     threshold: Flag bands above threshold * mean band power
    ///     window_low: Window of interest, lower edge (Hz)
    ///     window_high: Window of interest, upper edge (Hz)
    ///     window_type: Taper for the band filters
    ///     use_fft: Use FFT overlap-add instead of direct convolution
    ///     pin_workers: Pin workers to processors (failures only warn)
    #[new]
    #[pyo3(signature = (
        sample_rate,
        filter_order=32,
        num_bands=64,
        num_threads=1,
        threshold=2.0,
        window_low=50000.0,
        window_high=150000.0,
        window_type=PyWindowType::Hamming,
        use_fft=false,
        pin_workers=false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        sample_rate: f64,
        filter_order: usize,
        num_bands: usize,
        num_threads: usize,
        threshold: f64,
        window_low: f64,
        window_high: f64,
        window_type: PyWindowType,
        use_fft: bool,
        pin_workers: bool,
    ) -> PyResult<Self> {
        let config = ScanConfig {
            sample_rate,
            filter_order,
            num_bands,
            num_threads,
            threshold,
            window_low,
            window_high,
            window_type: window_type.into(),
            method: if use_fft { ConvolutionMethod::Fft } else { ConvolutionMethod::Direct },
            affinity: if pin_workers { AffinityMode::Relaxed } else { AffinityMode::Disabled },
            ..ScanConfig::default()
        };
        config
            .validate()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;

        Ok(Self { config })
    }

    /// Scan a signal
    ///
    /// The DC component is removed from a copy of `samples`.
    ///
    /// Returns:
    ///     (band powers as numpy array, (low, high) envelope of flagged bands or None)
    fn scan<'py>(
        &self,
        py: Python<'py>,
        samples: PyReadonlyArray1<f64>,
    ) -> PyResult<(&'py PyArray1<f64>, Option<(f64, f64)>)> {
        let samples = samples
            .as_slice()
            .map_err(|e| PyValueError::new_err(e.to_string()))?
            .to_vec();
        let config = self.config.clone();

        let outcome = py
            .allow_threads(move || run_scan(&config, samples))
            .map_err(to_py_err)?;

        let envelope = outcome.verdict.envelope();
        Ok((PyArray1::from_vec(py, outcome.verdict.powers()), envelope))
    }

    /// Edges (low, high) in Hz of every band
    fn band_edges(&self) -> Vec<(f64, f64)> {
        let plan = crate::scan::BandPlan::new(self.config.sample_rate, self.config.num_bands);
        (0..plan.num_bands())
            .map(|band| {
                let edges = plan.edges(band);
                (edges.low_hz, edges.high_hz)
            })
            .collect()
    }

    /// Get current sample rate
    fn get_sample_rate(&self) -> f64 {
        self.config.sample_rate
    }

    /// Get number of bands
    fn get_num_bands(&self) -> usize {
        self.config.num_bands
    }
}
