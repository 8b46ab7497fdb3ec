//! FFT-based fast convolution for long signals
//!
//! Implements overlap-add with frequency-domain multiplication
//! Complexity: O(N log N) vs O(N*M) for time-domain

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Smallest input block handed to the FFT
const MIN_BLOCK_SIZE: usize = 1024;

/// FFT-based FIR filter using overlap-add
pub struct FastFirFilter {
    /// Filter coefficients in frequency domain
    h_fft: Vec<Complex<f64>>,

    /// FFT size (power of 2, >= block_size + filter_length - 1)
    fft_size: usize,

    /// Block size for input
    block_size: usize,

    /// Tail carried into the next block
    overlap: Vec<f64>,

    /// Scratch for building the next tail
    next_overlap: Vec<f64>,

    fft: Arc<dyn Fft<f64>>,
    ifft: Arc<dyn Fft<f64>>,

    /// Reusable frequency-domain scratch
    buffer: Vec<Complex<f64>>,
}

impl FastFirFilter {
    /// Create new FFT-based filter
    ///
    /// # Arguments
    /// * `coefficients` - Filter coefficients h[n]
    /// * `block_size` - Input block size, raised to the filter length if shorter
    pub fn new(coefficients: &[f64], block_size: usize) -> Self {
        let filter_length = coefficients.len().max(1);
        let block_size = block_size.max(filter_length);
        let fft_size = (block_size + filter_length - 1).next_power_of_two();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let ifft = planner.plan_fft_inverse(fft_size);

        let mut h_fft = vec![Complex::new(0.0, 0.0); fft_size];
        for (slot, &coeff) in h_fft.iter_mut().zip(coefficients) {
            *slot = Complex::new(coeff, 0.0);
        }
        fft.process(&mut h_fft);

        Self {
            h_fft,
            fft_size,
            block_size,
            overlap: vec![0.0; filter_length - 1],
            next_overlap: vec![0.0; filter_length - 1],
            fft,
            ifft,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
        }
    }

    /// Filter one block, writing the causal output for the same span
    ///
    /// `input` and `output` must have equal length, at most `block_size`.
    pub fn process_block_into(&mut self, input: &[f64], output: &mut [f64]) {
        debug_assert_eq!(input.len(), output.len());
        let n = input.len().min(self.block_size);

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            *slot = if i < n {
                Complex::new(input[i], 0.0)
            } else {
                Complex::new(0.0, 0.0)
            };
        }

        self.fft.process(&mut self.buffer);
        for (x, h) in self.buffer.iter_mut().zip(self.h_fft.iter()) {
            *x *= *h;
        }
        self.ifft.process(&mut self.buffer);

        let scale = 1.0 / self.fft_size as f64;

        for i in 0..n {
            output[i] = self.buffer[i].re * scale + self.overlap.get(i).copied().unwrap_or(0.0);
        }

        // Shift the unconsumed part of the old tail and add the new one
        for (i, slot) in self.next_overlap.iter_mut().enumerate() {
            let carried = self.overlap.get(n + i).copied().unwrap_or(0.0);
            let fresh = if n + i < self.fft_size {
                self.buffer[n + i].re * scale
            } else {
                0.0
            };
            *slot = carried + fresh;
        }
        std::mem::swap(&mut self.overlap, &mut self.next_overlap);
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

/// Block size used for a filter of `filter_length` taps
fn block_size_for(filter_length: usize) -> usize {
    (4 * filter_length).next_power_of_two().max(MIN_BLOCK_SIZE)
}

/// Mean of squared filter output, computed with overlap-add
///
/// Produces the same zero-padded output as the direct kernel: the taps are
/// reversed so the causal convolution, delayed by the filter order, lines up
/// with `y[n] = Σ h[k]·x[n + k]`.
pub fn filtered_power_fft(signal: &[f64], coeffs: &[f64]) -> f64 {
    if signal.is_empty() || coeffs.is_empty() {
        return 0.0;
    }

    let delay = coeffs.len() - 1;
    let reversed: Vec<f64> = coeffs.iter().rev().copied().collect();
    let mut filter = FastFirFilter::new(&reversed, block_size_for(coeffs.len()));
    let block_size = filter.block_size();

    let tail = vec![0.0; delay];
    let mut output = vec![0.0; block_size];
    let mut position = 0usize;
    let mut sum_sq = 0.0;

    for block in signal.chunks(block_size).chain(tail.chunks(block_size)) {
        let out = &mut output[..block.len()];
        filter.process_block_into(block, out);

        for &y in out.iter() {
            if position >= delay && position < delay + signal.len() {
                sum_sq += y * y;
            }
            position += 1;
        }
    }

    sum_sq / signal.len() as f64
}
