//! Sampled time-domain signal and its preprocessing

pub mod loader;
pub mod mapped;

pub use loader::{load, SignalError, SignalFormat};
pub use mapped::MappedSamples;

use std::ops::{Deref, DerefMut};

/// Sample storage, either read into memory or mapped from the file
#[derive(Debug)]
pub enum SampleBuffer {
    Owned(Vec<f64>),
    Mapped(MappedSamples),
}

impl Deref for SampleBuffer {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        match self {
            SampleBuffer::Owned(samples) => samples.as_slice(),
            SampleBuffer::Mapped(samples) => &samples[..],
        }
    }
}

impl DerefMut for SampleBuffer {
    fn deref_mut(&mut self) -> &mut [f64] {
        match self {
            SampleBuffer::Owned(samples) => samples.as_mut_slice(),
            SampleBuffer::Mapped(samples) => &mut samples[..],
        }
    }
}

impl From<Vec<f64>> for SampleBuffer {
    fn from(samples: Vec<f64>) -> Self {
        SampleBuffer::Owned(samples)
    }
}

/// A signal: samples plus the sampling rate they were taken at
#[derive(Debug)]
pub struct Signal {
    sample_rate: f64,
    samples: SampleBuffer,
}

impl Signal {
    /// Attach a sampling rate (Hz) to loaded samples
    pub fn new(samples: impl Into<SampleBuffer>, sample_rate: f64) -> Self {
        Self {
            sample_rate,
            samples: samples.into(),
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Nyquist frequency Fs/2
    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Subtract the mean from every sample
    ///
    /// # Returns
    /// The DC component that was removed
    pub fn remove_dc(&mut self) -> f64 {
        let dc = remove_dc(&mut self.samples);
        log::info!("Removing DC component of {}", dc);
        dc
    }
}

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Largest value, `None` for an empty slice
pub fn max_of(data: &[f64]) -> Option<f64> {
    data.iter().copied().reduce(f64::max)
}

/// Subtract the mean in place and return it
pub fn remove_dc(data: &mut [f64]) -> f64 {
    let dc = mean(data);
    for sample in data.iter_mut() {
        *sample -= dc;
    }
    dc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_dc_constant_signal() {
        let mut signal = Signal::new(vec![5.0; 1000], 1_000_000.0);
        let dc = signal.remove_dc();

        assert_eq!(dc, 5.0);
        assert!(signal.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_remove_dc_idempotent() {
        let mut data: Vec<f64> = (0..517).map(|n| 3.0 + (n as f64 * 0.21).sin()).collect();

        remove_dc(&mut data);
        let once = data.clone();
        let second_dc = remove_dc(&mut data);

        assert!(second_dc.abs() < 1e-12, "second pass removed {}", second_dc);
        for (a, b) in once.iter().zip(data.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
        assert!(mean(&data).abs() < 1e-12);
    }

    #[test]
    fn test_statistics() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), 3.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(max_of(&[1.0, 7.5, -3.0]), Some(7.5));
        assert_eq!(max_of(&[]), None);
    }

    #[test]
    fn test_signal_accessors() {
        let signal = Signal::new(vec![1.0, 2.0], 48_000.0);
        assert_eq!(signal.len(), 2);
        assert!(!signal.is_empty());
        assert_eq!(signal.nyquist(), 24_000.0);
        assert_eq!(signal.sample_rate(), 48_000.0);
    }
}
