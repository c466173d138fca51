//! Streaming content hasher with pluggable digest algorithms.
//!
//! # Overview
//!
//! A [`Digester`] turns a byte stream into a 256-bit fingerprint. The
//! [`Hasher`] opens files, streams them through the configured digester in
//! fixed-size chunks, and observes the shutdown flag between chunks so a
//! large file can be abandoned mid-read.
//!
//! # Example
//!
//! ```no_run
//! use dupfilter::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let hash = hasher.full_hash(Path::new("file.bin")).unwrap();
//! println!("{}", hash_to_hex(&hash));
//! ```

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::HashError;

/// A 256-bit content fingerprint.
pub type Hash = [u8; 32];

/// Read buffer size used when streaming file content (64KB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Produces a content fingerprint from a byte stream.
///
/// Implementations must consume the reader to the end and return the same
/// fingerprint for the same byte sequence. Errors from the reader are
/// propagated unchanged.
pub trait Digester: Send + Sync {
    /// Short algorithm name for logs and output.
    fn name(&self) -> &'static str;

    /// Digest the entire stream.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by `reader`.
    fn digest(&self, reader: &mut dyn Read) -> io::Result<Hash>;
}

/// BLAKE3 digester (the default).
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Digester;

impl Digester for Blake3Digester {
    fn name(&self) -> &'static str {
        "blake3"
    }

    fn digest(&self, reader: &mut dyn Read) -> io::Result<Hash> {
        let mut hasher = blake3::Hasher::new();
        io::copy(reader, &mut hasher)?;
        Ok(*hasher.finalize().as_bytes())
    }
}

/// SHA-256 digester.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digester;

impl Digester for Sha256Digester {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn digest(&self, reader: &mut dyn Read) -> io::Result<Hash> {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        io::copy(reader, &mut hasher)?;
        Ok(hasher.finalize().into())
    }
}

/// Built-in digest algorithms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// BLAKE3 (fast, cryptographically secure)
    #[default]
    Blake3,
    /// SHA-256
    Sha256,
}

impl DigestAlgorithm {
    /// Build the digester for this algorithm.
    #[must_use]
    pub fn digester(self) -> Arc<dyn Digester> {
        match self {
            Self::Blake3 => Arc::new(Blake3Digester),
            Self::Sha256 => Arc::new(Sha256Digester),
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blake3 => write!(f, "blake3"),
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Reader adapter that fails once the shutdown flag is raised.
///
/// Uses `ErrorKind::Other` rather than `Interrupted` because `io::copy`
/// retries interrupted reads.
struct ShutdownReader<R> {
    inner: R,
    flag: Option<Arc<AtomicBool>>,
}

impl<R: Read> Read for ShutdownReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.flag.as_ref().is_some_and(|f| f.load(Ordering::SeqCst)) {
            return Err(io::Error::other("hashing cancelled"));
        }
        self.inner.read(buf)
    }
}

/// File hasher that streams content through a [`Digester`].
#[derive(Clone)]
pub struct Hasher {
    digester: Arc<dyn Digester>,
    buffer_size: usize,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl std::fmt::Debug for Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hasher")
            .field("digester", &self.digester.name())
            .field("buffer_size", &self.buffer_size)
            .field("shutdown_flag", &self.shutdown_flag)
            .finish()
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a BLAKE3 hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::with_digester(Arc::new(Blake3Digester))
    }

    /// Create a hasher using a custom digester.
    #[must_use]
    pub fn with_digester(digester: Arc<dyn Digester>) -> Self {
        Self {
            digester,
            buffer_size: DEFAULT_BUFFER_SIZE,
            shutdown_flag: None,
        }
    }

    /// Set the read buffer size (minimum 1 byte).
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Set the shutdown flag observed between read chunks.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Name of the underlying digest algorithm.
    #[must_use]
    pub fn algorithm(&self) -> &'static str {
        self.digester.name()
    }

    /// Hash the full content of a file.
    ///
    /// # Errors
    ///
    /// Returns `HashError` if the file cannot be opened or read, or
    /// `HashError::Interrupted` if the shutdown flag was raised mid-read.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;

        let mut reader = ShutdownReader {
            inner: BufReader::with_capacity(self.buffer_size, file),
            flag: self.shutdown_flag.clone(),
        };

        match self.digester.digest(&mut reader) {
            Ok(hash) => Ok(hash),
            Err(_) if self.is_shutdown_requested() => {
                Err(HashError::Interrupted(path.to_path_buf()))
            }
            Err(e) => Err(HashError::from_io(path.to_path_buf(), e)),
        }
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Format a hash as lowercase hexadecimal (64 characters).
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}
