//! Zero-padded convolution and power estimation
//!
//! The filtered signal keeps the input length: output sample `n` sees the
//! taps `h[k]` against `x[n + k]`, with samples past the end treated as zero.

use super::design::{design_band_pass, BandEdges};
use super::fast_fir::filtered_power_fft;
use super::windows::WindowType;
use std::fmt;
use std::str::FromStr;

/// How the band filter is applied to the signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvolutionMethod {
    /// Time-domain convolution, O(N*M)
    #[default]
    Direct,

    /// FFT overlap-add, O(N log N)
    Fft,
}

impl fmt::Display for ConvolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvolutionMethod::Direct => f.write_str("direct"),
            ConvolutionMethod::Fft => f.write_str("fft"),
        }
    }
}

impl FromStr for ConvolutionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(ConvolutionMethod::Direct),
            "fft" => Ok(ConvolutionMethod::Fft),
            other => Err(format!("unknown convolution method '{}'", other)),
        }
    }
}

/// Filter settings shared by every band of a scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelSettings {
    pub filter_order: usize,
    pub sample_rate: f64,
    pub window_type: WindowType,
    pub method: ConvolutionMethod,
}

impl KernelSettings {
    /// Hamming-windowed direct convolution
    pub fn new(filter_order: usize, sample_rate: f64) -> Self {
        Self {
            filter_order,
            sample_rate,
            window_type: WindowType::Hamming,
            method: ConvolutionMethod::Direct,
        }
    }

    /// Design the band filter and measure the power it passes
    pub fn band_power(&self, signal: &[f64], edges: BandEdges) -> f64 {
        let coeffs = design_band_pass(self.sample_rate, edges, self.filter_order, self.window_type);
        match self.method {
            ConvolutionMethod::Direct => filtered_power(signal, &coeffs),
            ConvolutionMethod::Fft => filtered_power_fft(signal, &coeffs),
        }
    }
}

/// Power of `signal` after band-pass filtering to `[band_low, band_high]` Hz
///
/// Hamming window, direct convolution. `filter_order` must be even and positive,
/// and `0 <= band_low < band_high <= sample_rate / 2`.
pub fn compute_band_power(
    signal: &[f64],
    band_low: f64,
    band_high: f64,
    filter_order: usize,
    sample_rate: f64,
) -> f64 {
    KernelSettings::new(filter_order, sample_rate)
        .band_power(signal, BandEdges::new(band_low, band_high))
}

#[inline]
fn output_sample(signal: &[f64], coeffs: &[f64], n: usize) -> f64 {
    coeffs
        .iter()
        .zip(&signal[n..])
        .fold(0.0, |acc, (&h, &x)| acc + h * x)
}

/// Convolve with zero padding, output length equals input length
pub fn convolve_zero_padded(signal: &[f64], coeffs: &[f64]) -> Vec<f64> {
    (0..signal.len())
        .map(|n| output_sample(signal, coeffs, n))
        .collect()
}

/// Mean of squared filter output: (1/N) Σ y[n]²
///
/// Single sequential accumulation, so repeated calls are bit-identical.
pub fn filtered_power(signal: &[f64], coeffs: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }

    let sum_sq = (0..signal.len()).fold(0.0, |acc, n| {
        let y = output_sample(signal, coeffs, n);
        acc + y * y
    });

    sum_sq / signal.len() as f64
}
