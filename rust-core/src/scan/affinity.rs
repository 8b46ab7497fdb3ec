//! Processor affinity policies for band workers
//!
//! The pool asks the policy to bind each worker thread when it starts.
//! Pinning is injectable so the engine can run where binding is forbidden.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AffinityError {
    #[error("sched_setaffinity to processor {cpu} failed: {source}")]
    Bind {
        cpu: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("processor {0} is outside the supported CPU set")]
    OutOfRange(usize),

    #[error("processor affinity is not supported on this platform")]
    Unsupported,
}

/// Decides where each worker runs and binds it there
pub trait AffinityPolicy: Send + Sync {
    /// Processor for `worker_id`, `None` to leave the worker unpinned
    fn processor_for(&self, worker_id: usize) -> Option<usize>;

    /// Bind the calling thread for `worker_id`
    ///
    /// # Returns
    /// The processor the thread is now pinned to, if any
    fn apply(&self, worker_id: usize) -> Result<Option<usize>, AffinityError>;
}

/// Pins worker `i` to processor `i % num_processors`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinToProcessor {
    pub num_processors: usize,

    /// Binding failure is an error when set, a warning otherwise
    pub strict: bool,
}

impl PinToProcessor {
    pub fn strict(num_processors: usize) -> Self {
        Self { num_processors, strict: true }
    }

    pub fn relaxed(num_processors: usize) -> Self {
        Self { num_processors, strict: false }
    }
}

impl AffinityPolicy for PinToProcessor {
    fn processor_for(&self, worker_id: usize) -> Option<usize> {
        Some(worker_id % self.num_processors.max(1))
    }

    fn apply(&self, worker_id: usize) -> Result<Option<usize>, AffinityError> {
        let Some(cpu) = self.processor_for(worker_id) else {
            return Ok(None);
        };

        match set_cpu_affinity(cpu) {
            Ok(()) => Ok(Some(cpu)),
            Err(e) if !self.strict => {
                log::warn!("Worker {} left unpinned: {}", worker_id, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Leaves scheduling to the OS
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAffinity;

impl AffinityPolicy for NoAffinity {
    fn processor_for(&self, _worker_id: usize) -> Option<usize> {
        None
    }

    fn apply(&self, _worker_id: usize) -> Result<Option<usize>, AffinityError> {
        Ok(None)
    }
}

/// Pin the calling thread to a single processor
#[cfg(target_os = "linux")]
pub fn set_cpu_affinity(cpu: usize) -> Result<(), AffinityError> {
    if cpu >= libc::CPU_SETSIZE as usize {
        return Err(AffinityError::OutOfRange(cpu));
    }

    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(cpu, &mut set);

        if libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set) != 0 {
            return Err(AffinityError::Bind {
                cpu,
                source: std::io::Error::last_os_error(),
            });
        }
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn set_cpu_affinity(_cpu: usize) -> Result<(), AffinityError> {
    Err(AffinityError::Unsupported)
}

/// Number of processors available to this process
pub fn available_processors() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processor_mapping_wraps() {
        let policy = PinToProcessor::strict(3);
        let cpus: Vec<_> = (0..7).map(|id| policy.processor_for(id)).collect();
        assert_eq!(cpus, vec![Some(0), Some(1), Some(2), Some(0), Some(1), Some(2), Some(0)]);
    }

    #[test]
    fn test_no_affinity_never_binds() {
        assert_eq!(NoAffinity.processor_for(5), None);
        assert!(matches!(NoAffinity.apply(5), Ok(None)));
    }

    #[test]
    fn test_relaxed_policy_never_fails() {
        // Processor far beyond any real machine
        let policy = PinToProcessor::relaxed(1 << 20);
        let worker = (1 << 20) - 1;
        assert!(policy.apply(worker).is_ok());
    }

    #[test]
    fn test_strict_policy_reports_bad_processor() {
        let policy = PinToProcessor::strict(1 << 20);
        assert!(policy.apply((1 << 20) - 1).is_err());
    }

    #[test]
    fn test_available_processors_positive() {
        assert!(available_processors() >= 1);
    }
}
