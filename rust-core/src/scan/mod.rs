//! Parallel band scan
//!
//! The spectrum [0, Fs/2] is split into equal bands, each band is filtered
//! and measured by a fixed pool of workers, and the resulting power table is
//! checked for bands that stand out inside the window of interest.

pub mod affinity;
pub mod analyzer;
pub mod config;
pub mod partition;
pub mod pool;
pub mod report;

pub use affinity::{AffinityError, AffinityPolicy, NoAffinity, PinToProcessor};
pub use analyzer::{AnomalyAnalyzer, BandReport, Detection, ScanVerdict};
pub use config::{AffinityMode, ConfigError, ScanConfig};
pub use pool::{PoolReport, WorkerOutcome, WorkerPool};

use std::time::{Duration, Instant};
use thiserror::Error;

use crate::filters::BandEdges;
use crate::signal::{SampleBuffer, Signal, SignalError};

/// Offset keeping band edges off exact multiples of the bandwidth (Hz)
pub const BAND_GUARD_HZ: f64 = 0.0001;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error("Signal contains no samples")]
    EmptySignal,

    #[error("Worker {worker_id} could not set processor affinity: {source}")]
    Affinity {
        worker_id: usize,
        #[source]
        source: AffinityError,
    },

    #[error("Only {started} of {requested} workers started")]
    IncompleteStart { started: usize, requested: usize },

    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),
}

/// Band layout derived from the sampling rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPlan {
    nyquist: f64,
    bandwidth: f64,
    num_bands: usize,
}

impl BandPlan {
    pub fn new(sample_rate: f64, num_bands: usize) -> Self {
        Self::with_nyquist(sample_rate / 2.0, num_bands)
    }

    /// Plan covering [0, Fs/2] of `signal`
    pub fn for_signal(signal: &Signal, num_bands: usize) -> Self {
        Self::with_nyquist(signal.nyquist(), num_bands)
    }

    fn with_nyquist(nyquist: f64, num_bands: usize) -> Self {
        Self {
            nyquist,
            bandwidth: nyquist / num_bands as f64,
            num_bands,
        }
    }

    pub fn nyquist(&self) -> f64 {
        self.nyquist
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    /// Passband of `band`, pulled in by the guard on both sides
    pub fn edges(&self, band: usize) -> BandEdges {
        BandEdges::new(
            band as f64 * self.bandwidth + BAND_GUARD_HZ,
            (band + 1) as f64 * self.bandwidth - BAND_GUARD_HZ,
        )
    }
}

/// Wall-clock time spent in each phase
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScanTiming {
    pub preprocess: Duration,
    pub filtering: Duration,
    pub analysis: Duration,
}

/// Everything a completed scan produced
#[derive(Debug)]
pub struct ScanOutcome {
    pub verdict: ScanVerdict,
    pub dc_removed: f64,
    pub workers: PoolReport,
    pub timing: ScanTiming,
}

/// State of one scan: configuration, band plan, signal and power table
pub struct AnalysisContext {
    config: ScanConfig,
    plan: BandPlan,
    signal: Signal,
    band_power: Vec<f64>,
}

impl AnalysisContext {
    /// Validate `config` and attach its sampling rate to `samples`
    pub fn new(config: ScanConfig, samples: impl Into<SampleBuffer>) -> Result<Self, ScanError> {
        config.validate()?;

        let signal = Signal::new(samples, config.sample_rate);
        if signal.is_empty() {
            return Err(ScanError::EmptySignal);
        }

        let plan = BandPlan::for_signal(&signal, config.num_bands);
        let band_power = vec![0.0; config.num_bands];

        Ok(Self {
            config,
            plan,
            signal,
            band_power,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn plan(&self) -> &BandPlan {
        &self.plan
    }

    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    pub fn band_power(&self) -> &[f64] {
        &self.band_power
    }

    /// Remove the DC component; must run before the workers start
    pub fn preprocess(&mut self) -> f64 {
        self.signal.remove_dc()
    }

    /// Run the worker pool over every band
    ///
    /// Any worker that fails to start, to pin itself or to finish fails the
    /// whole scan, so a successful return means every band was written once.
    pub fn compute_band_powers(&mut self, policy: &dyn AffinityPolicy) -> Result<PoolReport, ScanError> {
        let Self {
            config,
            plan,
            signal,
            band_power,
        } = self;

        let pool = WorkerPool::new(config.num_threads, policy);
        let kernel = config.kernel();
        log::info!(
            "Scanning {} bands of {:.6} Hz with {} workers",
            plan.num_bands(),
            plan.bandwidth(),
            pool.num_threads()
        );

        let report = pool.run(signal.samples(), plan, &kernel, band_power);
        check_workers(report)
    }

    /// Flag anomalous bands in the completed power table
    pub fn analyze(&self) -> ScanVerdict {
        AnomalyAnalyzer::from_config(&self.config).analyze(&self.plan, &self.band_power)
    }
}

fn check_workers(report: PoolReport) -> Result<PoolReport, ScanError> {
    if report.all_completed() {
        return Ok(report);
    }

    let requested = report.outcomes.len();
    let started = report.started();

    for outcome in report.outcomes {
        match outcome {
            WorkerOutcome::AffinityFailed { worker_id, source } => {
                return Err(ScanError::Affinity { worker_id, source });
            }
            WorkerOutcome::Panicked { worker_id } => {
                return Err(ScanError::WorkerPanicked(worker_id));
            }
            WorkerOutcome::Completed(_) | WorkerOutcome::NotStarted(_) => {}
        }
    }

    Err(ScanError::IncompleteStart { started, requested })
}

/// Run a complete scan with the affinity policy named in `config`
pub fn run_scan(config: &ScanConfig, samples: impl Into<SampleBuffer>) -> Result<ScanOutcome, ScanError> {
    let policy = config.affinity_policy();
    run_scan_with_policy(config, samples, &*policy)
}

/// Run a complete scan with an explicit affinity policy
pub fn run_scan_with_policy(
    config: &ScanConfig,
    samples: impl Into<SampleBuffer>,
    policy: &dyn AffinityPolicy,
) -> Result<ScanOutcome, ScanError> {
    let mut context = AnalysisContext::new(config.clone(), samples)?;

    let start = Instant::now();
    let dc_removed = context.preprocess();
    let preprocess = start.elapsed();

    let start = Instant::now();
    let workers = context.compute_band_powers(policy)?;
    let filtering = start.elapsed();

    let start = Instant::now();
    let verdict = context.analyze();
    let analysis = start.elapsed();

    let timing = ScanTiming {
        preprocess,
        filtering,
        analysis,
    };
    log::info!(
        "Scan finished: preprocess {:?}, filtering {:?}, analysis {:?}",
        timing.preprocess,
        timing.filtering,
        timing.analysis
    );

    Ok(ScanOutcome {
        verdict,
        dc_removed,
        workers,
        timing,
    })
}
