//! Signal file loaders
//!
//! Three encodings are supported: whitespace-separated text, raw native-endian
//! `f64` binary, and the same binary layout memory-mapped.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use super::mapped::MappedSamples;
use super::SampleBuffer;

#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: '{token}' is not a sample value")]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
    },

    #[error("{path} holds {bytes} bytes, not a whole number of 8-byte samples")]
    Misaligned { path: PathBuf, bytes: usize },

    #[error("{0} contains no samples")]
    Empty(PathBuf),

    #[error("Failed to map {path}: {source}")]
    Map {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown signal type '{0}' (expected text, bin or mmap)")]
    UnknownFormat(String),
}

/// On-disk signal encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalFormat {
    Text,
    Binary,
    MappedBinary,
}

impl SignalFormat {
    pub fn describe(&self) -> &'static str {
        match self {
            SignalFormat::Text => "Text",
            SignalFormat::Binary => "Binary",
            SignalFormat::MappedBinary => "Mapped Binary",
        }
    }
}

impl fmt::Display for SignalFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

impl FromStr for SignalFormat {
    type Err = SignalError;

    /// Selected by the first letter, case-insensitive (`text`, `bin`, `mmap`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('T') => Ok(SignalFormat::Text),
            Some('B') => Ok(SignalFormat::Binary),
            Some('M') => Ok(SignalFormat::MappedBinary),
            _ => Err(SignalError::UnknownFormat(s.to_string())),
        }
    }
}

/// Load or map a signal file
///
/// The sampling rate is not stored in any encoding; the caller attaches it
/// when building a [`super::Signal`].
pub fn load(format: SignalFormat, path: impl AsRef<Path>) -> Result<SampleBuffer, SignalError> {
    let path = path.as_ref();
    let buffer = match format {
        SignalFormat::Text => SampleBuffer::Owned(load_text(path)?),
        SignalFormat::Binary => SampleBuffer::Owned(load_binary(path)?),
        SignalFormat::MappedBinary => SampleBuffer::Mapped(MappedSamples::open(path)?),
    };

    if buffer.is_empty() {
        return Err(SignalError::Empty(path.to_path_buf()));
    }

    log::info!("Loaded {} samples from {} ({})", buffer.len(), path.display(), format);
    Ok(buffer)
}

/// Parse whitespace-separated decimal samples
pub fn load_text(path: &Path) -> Result<Vec<f64>, SignalError> {
    let io_err = |source| SignalError::Io {
        path: path.to_path_buf(),
        source,
    };

    let reader = BufReader::new(File::open(path).map_err(io_err)?);
    let mut samples = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(io_err)?;
        for token in line.split_whitespace() {
            let value = token.parse::<f64>().map_err(|_| SignalError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
                token: token.to_string(),
            })?;
            samples.push(value);
        }
    }

    Ok(samples)
}

/// Read raw native-endian `f64` samples
pub fn load_binary(path: &Path) -> Result<Vec<f64>, SignalError> {
    let bytes = fs::read(path).map_err(|source| SignalError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.len() % 8 != 0 {
        return Err(SignalError::Misaligned {
            path: path.to_path_buf(),
            bytes: bytes.len(),
        });
    }

    Ok(bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            f64::from_ne_bytes(raw)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn temp_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    fn binary_bytes(samples: &[f64]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_ne_bytes()).collect()
    }

    #[test]
    fn test_format_selection() {
        assert_eq!("text".parse::<SignalFormat>().unwrap(), SignalFormat::Text);
        assert_eq!("Bin".parse::<SignalFormat>().unwrap(), SignalFormat::Binary);
        assert_eq!("mmap".parse::<SignalFormat>().unwrap(), SignalFormat::MappedBinary);
        assert!(matches!("wav".parse::<SignalFormat>(), Err(SignalError::UnknownFormat(_))));
        assert!("".parse::<SignalFormat>().is_err());
    }

    #[test]
    fn test_load_text() {
        let dir = TempDir::new().unwrap();
        let path = temp_file(&dir, "text.txt", b"1.5\n-2.0 3e2\n\n  4\n");
        let buffer = load(SignalFormat::Text, &path).unwrap();
        assert_eq!(&buffer[..], &[1.5, -2.0, 300.0, 4.0]);
    }

    #[test]
    fn test_load_text_reports_bad_line() {
        let dir = TempDir::new().unwrap();
        let path = temp_file(&dir, "bad.txt", b"1.0\n2.0\nbogus\n");
        match load(SignalFormat::Text, &path) {
            Err(SignalError::Parse { line, token, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(token, "bogus");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_binary_and_mapped_agree() {
        let dir = TempDir::new().unwrap();
        let samples = [0.25, -1.0, 1e-3, 42.0];
        let path = temp_file(&dir, "samples.bin", &binary_bytes(&samples));

        let owned = load(SignalFormat::Binary, &path).unwrap();
        let mut mapped = load(SignalFormat::MappedBinary, &path).unwrap();
        assert_eq!(&owned[..], &samples);
        assert_eq!(&mapped[..], &samples);

        // Private mapping: writes do not reach the file
        mapped[0] = 99.0;
        let reread = load(SignalFormat::Binary, &path).unwrap();
        assert_eq!(reread[0], 0.25);
    }

    #[test]
    fn test_misaligned_binary_rejected() {
        let dir = TempDir::new().unwrap();
        let path = temp_file(&dir, "short.bin", &[0u8; 12]);
        assert!(matches!(load(SignalFormat::Binary, &path), Err(SignalError::Misaligned { bytes: 12, .. })));
        assert!(matches!(load(SignalFormat::MappedBinary, &path), Err(SignalError::Misaligned { .. })));
    }

    #[test]
    fn test_empty_and_missing_files_rejected() {
        let dir = TempDir::new().unwrap();
        let path = temp_file(&dir, "empty.bin", b"");
        assert!(matches!(load(SignalFormat::Binary, &path), Err(SignalError::Empty(_))));
        assert!(matches!(load(SignalFormat::MappedBinary, &path), Err(SignalError::Empty(_))));
        assert!(matches!(load(SignalFormat::Text, &path), Err(SignalError::Empty(_))));

        let missing = dir.path().join("does-not-exist.bin");
        assert!(matches!(load(SignalFormat::Binary, &missing), Err(SignalError::Io { .. })));
    }
}
