//! Band-pass FIR design and filtered-power kernels

pub mod windows;
pub mod design;
pub mod convolve;
pub mod fast_fir;

pub use windows::{WindowType, generate_window, apply_window_inplace};
pub use design::{BandEdges, design_band_pass, generate_band_pass, frequency_response, magnitude_response_db};
pub use convolve::{ConvolutionMethod, KernelSettings, compute_band_power, filtered_power};
pub use fast_fir::{FastFirFilter, filtered_power_fft};
