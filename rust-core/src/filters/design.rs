//! Band-pass FIR design using the windowing method
//!
//! Cutoffs are given in Hz and normalized by the sampling rate here, so
//! callers work in the same units as the band plan.

use super::windows::{apply_window_inplace, WindowType};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Passband edges of one band in Hz
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandEdges {
    /// Lower passband edge (Hz)
    pub low_hz: f64,

    /// Upper passband edge (Hz)
    pub high_hz: f64,
}

impl BandEdges {
    pub fn new(low_hz: f64, high_hz: f64) -> Self {
        Self { low_hz, high_hz }
    }

    /// Center frequency of the band (Hz)
    pub fn center_hz(&self) -> f64 {
        (self.low_hz + self.high_hz) / 2.0
    }

    pub fn width_hz(&self) -> f64 {
        self.high_hz - self.low_hz
    }

    /// True when the band shares any frequency with `[low_hz, high_hz]`
    pub fn intersects(&self, low_hz: f64, high_hz: f64) -> bool {
        self.low_hz <= high_hz && self.high_hz >= low_hz
    }
}

/// Ideal (unwindowed) band-pass impulse response
///
/// # Algorithm
/// Difference of two ideal lowpass responses at `high_hz` and `low_hz`:
/// h[n] = sin(2π·f2·k)/(π·k) - sin(2π·f1·k)/(π·k), k = n - order/2,
/// with f normalized by `sample_rate`. The center tap takes the limit
/// 2·(f2 - f1).
///
/// # Arguments
/// * `sample_rate` - Sampling rate Fs in Hz
/// * `edges` - Passband edges in Hz, `0 <= low < high <= Fs/2`
/// * `order` - Filter order (even, positive)
///
/// # Returns
/// `order + 1` symmetric taps
pub fn generate_band_pass(sample_rate: f64, edges: BandEdges, order: usize) -> Vec<f64> {
    debug_assert!(order > 0 && order % 2 == 0, "filter order must be even and positive");
    debug_assert!(
        edges.low_hz >= 0.0 && edges.low_hz < edges.high_hz && edges.high_hz <= sample_rate / 2.0,
        "band edges must satisfy 0 <= low < high <= Fs/2"
    );

    let ft1 = edges.low_hz / sample_rate;
    let ft2 = edges.high_hz / sample_rate;
    let center = order / 2;
    let half_order = order as f64 / 2.0;

    (0..=order)
        .map(|n| {
            if n == center {
                2.0 * (ft2 - ft1)
            } else {
                let k = n as f64 - half_order;
                (2.0 * PI * ft2 * k).sin() / (PI * k) - (2.0 * PI * ft1 * k).sin() / (PI * k)
            }
        })
        .collect()
}

/// Design a windowed band-pass FIR filter
///
/// Generates the ideal response and tapers it in place with `window_type`.
pub fn design_band_pass(
    sample_rate: f64,
    edges: BandEdges,
    order: usize,
    window_type: WindowType,
) -> Vec<f64> {
    let mut h = generate_band_pass(sample_rate, edges, order);
    apply_window_inplace(&mut h, window_type);
    h
}

/// Calculate frequency response at given frequencies
///
/// # Arguments
/// * `h` - Filter coefficients
/// * `frequencies` - Normalized frequencies (units of π rad/sample, 1.0 = Nyquist)
///
/// # Returns
/// Complex frequency response H(e^jω)
pub fn frequency_response(h: &[f64], frequencies: &[f64]) -> Vec<Complex64> {
    frequencies
        .iter()
        .map(|&omega| {
            let omega_rad = omega * PI;
            h.iter()
                .enumerate()
                .fold(Complex64::new(0.0, 0.0), |acc, (n, &h_n)| {
                    let phase = -(omega_rad * n as f64);
                    acc + h_n * Complex64::new(phase.cos(), phase.sin())
                })
        })
        .collect()
}

/// Calculate magnitude response in dB
pub fn magnitude_response_db(h: &[f64], frequencies: &[f64]) -> Vec<f64> {
    frequency_response(h, frequencies)
        .iter()
        .map(|c| 20.0 * c.norm().max(1e-300).log10())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f64 = 1_000_000.0;

    #[test]
    fn test_band_pass_length_and_symmetry() {
        let h = design_band_pass(FS, BandEdges::new(100_000.0, 150_000.0), 64, WindowType::Hamming);

        assert_eq!(h.len(), 65);
        for i in 0..h.len() / 2 {
            let diff = (h[i] - h[h.len() - 1 - i]).abs();
            assert!(diff < 1e-12, "Not symmetric at index {}: {} vs {}",
                    i, h[i], h[h.len() - 1 - i]);
        }
    }

    #[test]
    fn test_center_tap_limit() {
        let edges = BandEdges::new(100_000.0, 150_000.0);
        let h = generate_band_pass(FS, edges, 32);

        // 2 * (0.15 - 0.1)
        assert!((h[16] - 0.1).abs() < 1e-12);
        assert!(h.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_passband_and_stopband_gain() {
        // Passband 200-300 kHz at 1 MHz = [0.4, 0.6] in units of Nyquist
        let h = design_band_pass(FS, BandEdges::new(200_000.0, 300_000.0), 128, WindowType::Hamming);

        let response = magnitude_response_db(&h, &[0.5, 0.1, 0.9]);

        assert!(response[0].abs() < 0.5, "Passband gain off: {} dB", response[0]);
        assert!(response[1] < -40.0, "Lower stopband too high: {} dB", response[1]);
        assert!(response[2] < -40.0, "Upper stopband too high: {} dB", response[2]);
    }

    #[test]
    fn test_dc_gain_is_small() {
        let h = design_band_pass(FS, BandEdges::new(200_000.0, 300_000.0), 64, WindowType::Hamming);
        let sum: f64 = h.iter().sum();
        assert!(sum.abs() < 0.05, "DC gain too large: {}", sum);
    }

    #[test]
    fn test_band_edges_intersection() {
        let band = BandEdges::new(100_000.0, 150_000.0);
        assert!(band.intersects(50_000.0, 150_000.0));
        assert!(band.intersects(120_000.0, 130_000.0));
        assert!(!band.intersects(150_000.1, 200_000.0));
        assert_eq!(band.center_hz(), 125_000.0);
        assert_eq!(band.width_hz(), 50_000.0);
    }
}
