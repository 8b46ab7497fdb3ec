//! Python bindings for band-pass design and the filtered-power kernel

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use numpy::{PyArray1, PyReadonlyArray1};
use crate::filters::{self, BandEdges, KernelSettings, WindowType};

/// Window type enum exposed to Python
#[pyclass(name = "WindowType")]
#[derive(Clone)]
pub enum PyWindowType {
    Hann,
    Hamming,
    Blackman,
    Rectangular,
}

impl From<PyWindowType> for WindowType {
    fn from(py_win: PyWindowType) -> Self {
        match py_win {
            PyWindowType::Hann => WindowType::Hann,
            PyWindowType::Hamming => WindowType::Hamming,
            PyWindowType::Blackman => WindowType::Blackman,
            PyWindowType::Rectangular => WindowType::Rectangular,
        }
    }
}

fn check_band(band_low: f64, band_high: f64, filter_order: usize, sample_rate: f64) -> PyResult<()> {
    if !(sample_rate > 0.0) {
        return Err(PyValueError::new_err("sample_rate must be positive"));
    }
    if filter_order == 0 || filter_order % 2 != 0 {
        return Err(PyValueError::new_err("filter_order must be even and positive"));
    }
    if !(0.0 <= band_low && band_low < band_high && band_high <= sample_rate / 2.0) {
        return Err(PyValueError::new_err("band edges must satisfy 0 <= low < high <= sample_rate / 2"));
    }
    Ok(())
}

/// Power of a signal after band-pass filtering
///
/// Args:
///     samples: Signal as numpy array
///     band_low: Lower band edge (Hz)
///     band_high: Upper band edge (Hz)
///     filter_order: Even FIR order
///     sample_rate: Sampling rate (Hz)
///     window_type: Taper for the filter taps
#[pyfunction]
#[pyo3(signature = (samples, band_low, band_high, filter_order, sample_rate, window_type=PyWindowType::Hamming))]
pub fn band_power(
    py: Python<'_>,
    samples: PyReadonlyArray1<f64>,
    band_low: f64,
    band_high: f64,
    filter_order: usize,
    sample_rate: f64,
    window_type: PyWindowType,
) -> PyResult<f64> {
    check_band(band_low, band_high, filter_order, sample_rate)?;
    let signal = samples
        .as_slice()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

    let kernel = KernelSettings {
        window_type: window_type.into(),
        ..KernelSettings::new(filter_order, sample_rate)
    };
    let edges = BandEdges::new(band_low, band_high);

    Ok(py.allow_threads(|| kernel.band_power(signal, edges)))
}

/// Windowed band-pass filter taps
///
/// Returns:
///     filter_order + 1 coefficients as numpy array
#[pyfunction]
#[pyo3(signature = (band_low, band_high, filter_order, sample_rate, window_type=PyWindowType::Hamming))]
pub fn design_band_pass<'py>(
    py: Python<'py>,
    band_low: f64,
    band_high: f64,
    filter_order: usize,
    sample_rate: f64,
    window_type: PyWindowType,
) -> PyResult<&'py PyArray1<f64>> {
    check_band(band_low, band_high, filter_order, sample_rate)?;
    let taps = filters::design_band_pass(
        sample_rate,
        BandEdges::new(band_low, band_high),
        filter_order,
        window_type.into(),
    );
    Ok(PyArray1::from_vec(py, taps))
}

/// Magnitude response in dB of the windowed band-pass filter
///
/// Args:
///     frequencies: Frequencies in Hz, each in [0, sample_rate / 2]
///
/// Returns:
///     Gain in dB at each frequency as numpy array
#[pyfunction]
#[pyo3(signature = (band_low, band_high, filter_order, sample_rate, frequencies, window_type=PyWindowType::Hamming))]
pub fn band_response_db<'py>(
    py: Python<'py>,
    band_low: f64,
    band_high: f64,
    filter_order: usize,
    sample_rate: f64,
    frequencies: PyReadonlyArray1<f64>,
    window_type: PyWindowType,
) -> PyResult<&'py PyArray1<f64>> {
    check_band(band_low, band_high, filter_order, sample_rate)?;
    let nyquist = sample_rate / 2.0;
    let normalized: Vec<f64> = frequencies
        .as_slice()
        .map_err(|e| PyValueError::new_err(e.to_string()))?
        .iter()
        .map(|&f| f / nyquist)
        .collect();

    let taps = filters::design_band_pass(
        sample_rate,
        BandEdges::new(band_low, band_high),
        filter_order,
        window_type.into(),
    );
    Ok(PyArray1::from_vec(py, filters::magnitude_response_db(&taps, &normalized)))
}
