//! Scanner module for probing and hashing input files.
//!
//! This module provides functionality for:
//! - Size probing of an explicit list of paths (no directory walking)
//! - Streamed content hashing through a pluggable [`Digester`]
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`prober`]: Stat each input path and record its size
//! - [`hasher`]: Full-content digests (BLAKE3 or SHA-256)
//!
//! # Example
//!
//! ```no_run
//! use dupfilter::scanner::{probe_paths, ProbeConfig};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")];
//! let (records, stats) = probe_paths(&paths, &ProbeConfig::default());
//!
//! for record in &records {
//!     println!("{}: {} bytes", record.path.display(), record.size);
//! }
//! for err in &stats.errors {
//!     eprintln!("Warning: {}", err);
//! }
//! ```

pub mod hasher;
pub mod prober;

use std::path::PathBuf;

// Re-export main types
pub use hasher::{
    hash_to_hex, Blake3Digester, DigestAlgorithm, Digester, Hash, Hasher, Sha256Digester,
};
pub use prober::{probe_paths, ProbeConfig, ProbeStats};

/// Run `op` on a dedicated pool of `threads` workers.
///
/// Falls back to the global rayon pool if the dedicated pool cannot be built.
pub(crate) fn install_io_pool<OP, R>(threads: usize, op: OP) -> R
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
    {
        Ok(pool) => pool.install(op),
        Err(e) => {
            log::warn!(
                "Failed to create I/O thread pool ({}), using global pool with {} threads",
                e,
                rayon::current_num_threads()
            );
            op()
        }
    }
}

/// A probed input file.
///
/// `index` is the position of the path in the caller's input list and is
/// carried through every phase so that "first in input order" never depends
/// on map iteration or parallel completion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Position in the original input list
    pub index: usize,
    /// Path as supplied by the caller
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Content digest, only set for files whose size is shared
    pub digest: Option<Hash>,
}

impl FileRecord {
    /// Create a new record for a successfully probed file.
    #[must_use]
    pub fn new(index: usize, path: PathBuf, size: u64) -> Self {
        Self {
            index,
            path,
            size,
            digest: None,
        }
    }

    /// Return this record with its digest set.
    #[must_use]
    pub fn with_digest(mut self, digest: Hash) -> Self {
        self.digest = Some(digest);
        self
    }
}

/// Errors that can occur while probing an input path.
///
/// Every variant is recoverable: the path is excluded and probing continues.
#[derive(thiserror::Error, Debug)]
pub enum ProbeError {
    /// The path does not exist.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when examining the path.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path exists but is a directory or special file.
    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    /// Any other I/O error while examining the path.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ProbeError {
    /// Map an I/O error from `fs::metadata` onto a probe error.
    #[must_use]
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }

    /// The path this error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::NotAFile(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file disappeared between probing and hashing.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Hashing was cancelled by the shutdown flag.
    #[error("Hashing interrupted: {0}")]
    Interrupted(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Map an I/O error raised while opening or reading a file.
    #[must_use]
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }

    /// The path this error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Interrupted(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}
