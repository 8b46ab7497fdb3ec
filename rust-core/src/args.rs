use crate::filters::{ConvolutionMethod, WindowType};
use crate::scan::config::{DEFAULT_THRESHOLD, DEFAULT_WINDOW_HIGH, DEFAULT_WINDOW_LOW};
use crate::scan::{AffinityMode, ScanConfig};
use crate::signal::SignalFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "band-scan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Parallel band-pass scan for anomalous energy in a sampled signal.")]
pub struct Cli {
    /// Signal encoding: text, bin or mmap
    #[arg(index = 1)]
    pub format: SignalFormat,
    /// Path to the signal file
    #[arg(index = 2)]
    pub signal_file: PathBuf,
    /// Sampling rate in Hz
    #[arg(index = 3)]
    pub sample_rate: f64,
    /// Even FIR order
    #[arg(index = 4)]
    pub filter_order: usize,
    /// Number of equal-width bands across [0, Fs/2]
    #[arg(index = 5)]
    pub num_bands: usize,
    /// Number of worker threads
    #[arg(index = 6)]
    pub num_threads: usize,
    /// Number of processors to spread workers over
    #[arg(index = 7)]
    pub num_processors: usize,

    /// Flag bands above THRESHOLD times the mean band power
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,
    /// Window of interest, lower edge (Hz)
    #[arg(long, default_value_t = DEFAULT_WINDOW_LOW)]
    pub low: f64,
    /// Window of interest, upper edge (Hz)
    #[arg(long, default_value_t = DEFAULT_WINDOW_HIGH)]
    pub high: f64,
    /// Taper for the band filters: hann, hamming, blackman or rectangular
    #[arg(long, default_value_t = WindowType::Hamming)]
    pub window: WindowType,
    /// Convolution kernel: direct or fft
    #[arg(long, default_value_t = ConvolutionMethod::Direct)]
    pub method: ConvolutionMethod,
    /// strict, relaxed or disabled
    #[arg(long, default_value_t = AffinityMode::Strict)]
    pub affinity: AffinityMode,
}

impl Cli {
    pub fn to_scan_config(&self) -> ScanConfig {
        ScanConfig {
            sample_rate: self.sample_rate,
            filter_order: self.filter_order,
            num_bands: self.num_bands,
            num_threads: self.num_threads,
            num_processors: self.num_processors,
            threshold: self.threshold,
            window_low: self.low,
            window_high: self.high,
            window_type: self.window,
            method: self.method,
            affinity: self.affinity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from([
            "band-scan", "mmap", "sig.bin", "1000000", "32", "64", "8", "4",
        ])
        .unwrap();

        assert_eq!(cli.format, SignalFormat::MappedBinary);
        let config = cli.to_scan_config();
        assert_eq!(config.sample_rate, 1_000_000.0);
        assert_eq!(config.num_threads, 8);
        assert_eq!(config.num_processors, 4);
        assert_eq!(config.threshold, DEFAULT_THRESHOLD);
        assert_eq!(config.affinity, AffinityMode::Strict);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_options() {
        let cli = Cli::try_parse_from([
            "band-scan", "text", "sig.txt", "48000", "16", "10", "2", "2",
            "--threshold", "3.5", "--method", "fft", "--window", "blackman", "--affinity", "relaxed",
        ])
        .unwrap();

        let config = cli.to_scan_config();
        assert_eq!(config.threshold, 3.5);
        assert_eq!(config.method, ConvolutionMethod::Fft);
        assert_eq!(config.window_type, WindowType::Blackman);
        assert_eq!(config.affinity, AffinityMode::Relaxed);
    }

    #[test]
    fn test_missing_arguments_rejected() {
        assert!(Cli::try_parse_from(["band-scan", "text", "sig.txt"]).is_err());
        assert!(Cli::try_parse_from([
            "band-scan", "wav", "sig.txt", "48000", "16", "10", "2", "2",
        ])
        .is_err());
    }

    #[test]
    fn test_every_argument_has_help() {
        use clap::CommandFactory;

        let command = Cli::command();
        for arg in command.get_arguments() {
            if matches!(arg.get_id().as_str(), "help" | "version") {
                continue;
            }
            assert!(arg.get_help().is_some(), "argument {} has no help text", arg.get_id());
        }
    }
}
