//! Window functions applied to truncated band-pass impulse responses
//!
//! Tapering the ideal response suppresses the ripple caused by truncation

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(M-1))
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    /// Sidelobe attenuation: ~53 dB
    #[default]
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/(M-1)) + 0.08*cos(4πn/(M-1))
    Blackman,

    /// Rectangular window (plain truncation)
    Rectangular,
}

impl WindowType {
    /// Lower-case name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            WindowType::Hann => "hann",
            WindowType::Hamming => "hamming",
            WindowType::Blackman => "blackman",
            WindowType::Rectangular => "rectangular",
        }
    }
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WindowType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hann" | "hanning" => Ok(WindowType::Hann),
            "hamming" => Ok(WindowType::Hamming),
            "blackman" => Ok(WindowType::Blackman),
            "rectangular" | "rect" | "none" => Ok(WindowType::Rectangular),
            other => Err(format!("unknown window type '{}'", other)),
        }
    }
}

/// Window coefficient at tap `n` of a window spanning `length` taps
#[inline]
fn window_value(window_type: WindowType, n: usize, length: usize) -> f64 {
    if length < 2 {
        return 1.0;
    }
    let span = (length - 1) as f64;
    let angle = 2.0 * PI * n as f64 / span;

    match window_type {
        WindowType::Hann => 0.5 - 0.5 * angle.cos(),
        WindowType::Hamming => 0.54 - 0.46 * angle.cos(),
        WindowType::Blackman => 0.42 - 0.5 * angle.cos() + 0.08 * (2.0 * angle).cos(),
        WindowType::Rectangular => 1.0,
    }
}

/// Generate window coefficients
///
/// # Arguments
/// * `window_type` - Type of window function
/// * `length` - Number of samples (M)
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..M-1
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    (0..length)
        .map(|n| window_value(window_type, n, length))
        .collect()
}

/// Multiply filter coefficients by a window of matching length, in place
pub fn apply_window_inplace(coefficients: &mut [f64], window_type: WindowType) {
    let length = coefficients.len();
    for (n, c) in coefficients.iter_mut().enumerate() {
        *c *= window_value(window_type, n, length);
    }
}
