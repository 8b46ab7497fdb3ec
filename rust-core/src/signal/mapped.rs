//! Private copy-on-write memory mapping of a binary sample file

use std::fs::File;
use std::ops::{Deref, DerefMut};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::ptr::NonNull;

use super::loader::SignalError;

const SAMPLE_BYTES: usize = std::mem::size_of::<f64>();

/// Samples backed by a `MAP_PRIVATE` mapping
///
/// Writes (DC removal) land in private pages and never reach the file.
pub struct MappedSamples {
    ptr: NonNull<f64>,
    len: usize,
    map_len: usize,
}

// The mapping is exclusively owned, like a `Box<[f64]>`
unsafe impl Send for MappedSamples {}
unsafe impl Sync for MappedSamples {}

impl MappedSamples {
    /// Map a file of native-endian `f64` samples
    pub fn open(path: &Path) -> Result<Self, SignalError> {
        let file = File::open(path).map_err(|source| SignalError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let map_len = file
            .metadata()
            .map_err(|source| SignalError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .len() as usize;

        if map_len == 0 {
            return Err(SignalError::Empty(path.to_path_buf()));
        }
        if map_len % SAMPLE_BYTES != 0 {
            return Err(SignalError::Misaligned {
                path: path.to_path_buf(),
                bytes: map_len,
            });
        }

        let raw = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                map_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE,
                file.as_raw_fd(),
                0,
            )
        };
        if raw == libc::MAP_FAILED {
            return Err(SignalError::Map {
                path: path.to_path_buf(),
                source: std::io::Error::last_os_error(),
            });
        }

        // Page-aligned, so f64 alignment holds
        let ptr = NonNull::new(raw as *mut f64).ok_or_else(|| SignalError::Map {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "mmap returned null"),
        })?;

        // The mapping stays valid after the descriptor is closed
        Ok(Self {
            ptr,
            len: map_len / SAMPLE_BYTES,
            map_len,
        })
    }
}

impl Deref for MappedSamples {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for MappedSamples {
    fn deref_mut(&mut self) -> &mut [f64] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for MappedSamples {
    fn drop(&mut self) {
        let result = unsafe { libc::munmap(self.ptr.as_ptr() as *mut libc::c_void, self.map_len) };
        if result != 0 {
            log::warn!("munmap failed: {}", std::io::Error::last_os_error());
        }
    }
}

impl std::fmt::Debug for MappedSamples {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedSamples")
            .field("len", &self.len)
            .finish()
    }
}
