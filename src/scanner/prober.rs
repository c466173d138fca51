//! Size probing for an explicit list of input paths.
//!
//! # Overview
//!
//! The prober stats every input path once and turns each accessible regular
//! file into a [`FileRecord`] carrying its input index and size. Paths that
//! cannot be examined are reported as [`ProbeError`] warnings and dropped;
//! probing never fails as a whole.
//!
//! Output order always follows input order, even though the `stat` calls run
//! on a bounded rayon pool.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::{FileRecord, ProbeError};
use crate::progress::ProgressCallback;

/// Configuration for the probe phase.
#[derive(Clone)]
pub struct ProbeConfig {
    /// Number of I/O threads used for `stat` calls.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for ProbeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl ProbeConfig {
    /// Set the I/O thread count (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from the probe phase.
#[derive(Debug, Default)]
pub struct ProbeStats {
    /// Number of paths supplied by the caller
    pub input_paths: usize,
    /// Number of paths collapsed because they repeated an earlier path
    pub repeated_paths: usize,
    /// Number of files successfully probed
    pub probed_files: usize,
    /// Total size of all probed files in bytes
    pub total_size: u64,
    /// Paths that could not be probed
    pub errors: Vec<ProbeError>,
    /// Whether the phase was interrupted by shutdown
    pub interrupted: bool,
}

/// Probe the size of every input path.
///
/// Repeated occurrences of the same path are collapsed onto the first one.
/// Paths are compared by their exact spelling, so `dir/./f` and `dir/f` are
/// two inputs.
/// Each returned record keeps the index of its path in `paths`.
///
/// # Example
///
/// ```no_run
/// use dupfilter::scanner::{probe_paths, ProbeConfig};
/// use std::path::PathBuf;
///
/// let paths = vec![PathBuf::from("a.txt"), PathBuf::from("missing.txt")];
/// let (records, stats) = probe_paths(&paths, &ProbeConfig::default());
/// assert_eq!(records.len() + stats.errors.len(), 2);
/// ```
#[must_use]
pub fn probe_paths(paths: &[PathBuf], config: &ProbeConfig) -> (Vec<FileRecord>, ProbeStats) {
    let mut stats = ProbeStats {
        input_paths: paths.len(),
        ..Default::default()
    };

    let mut seen: HashSet<&OsStr> = HashSet::with_capacity(paths.len());
    let mut candidates: Vec<(usize, &PathBuf)> = Vec::with_capacity(paths.len());
    for (index, path) in paths.iter().enumerate() {
        if seen.insert(path.as_os_str()) {
            candidates.push((index, path));
        } else {
            stats.repeated_paths += 1;
            log::debug!("Ignoring repeated input path: {}", path.display());
        }
    }

    if candidates.is_empty() {
        return (Vec::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("probe", candidates.len());
    }

    log::info!("Probing {} input paths", candidates.len());

    let results: Vec<Option<Result<FileRecord, ProbeError>>> =
        super::install_io_pool(config.io_threads, || {
            candidates
                .par_iter()
                .enumerate()
                .map(|(n, &(index, path))| {
                    if config.is_shutdown_requested() {
                        return None;
                    }
                    if let Some(ref callback) = config.progress_callback {
                        callback.on_progress(n + 1, path.to_string_lossy().as_ref());
                    }
                    Some(probe_one(index, path))
                })
                .collect()
        });

    let mut records = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Some(Ok(record)) => {
                stats.probed_files += 1;
                stats.total_size += record.size;
                records.push(record);
            }
            Some(Err(e)) => {
                log::warn!("Skipping {}", e);
                stats.errors.push(e);
            }
            None => stats.interrupted = true,
        }
    }

    if stats.interrupted {
        log::info!("Probe phase interrupted by shutdown signal");
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("probe");
    }

    log::info!(
        "Probe complete: {} of {} paths sized, {} skipped",
        stats.probed_files,
        stats.input_paths,
        stats.errors.len()
    );

    (records, stats)
}

/// Stat a single path.
fn probe_one(index: usize, path: &Path) -> Result<FileRecord, ProbeError> {
    let metadata =
        fs::metadata(path).map_err(|e| ProbeError::from_io(path.to_path_buf(), e))?;

    if !metadata.is_file() {
        return Err(ProbeError::NotAFile(path.to_path_buf()));
    }

    log::trace!("Probed {} ({} bytes)", path.display(), metadata.len());
    Ok(FileRecord::new(index, path.to_path_buf(), metadata.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_probe_config_default() {
        let config = ProbeConfig::default();
        assert_eq!(config.io_threads, 4);
        assert!(config.shutdown_flag.is_none());
        assert!(config.progress_callback.is_none());
    }

    #[test]
    fn test_probe_config_io_threads_min() {
        let config = ProbeConfig::default().with_io_threads(0);
        assert_eq!(config.io_threads, 1);
    }

    #[test]
    fn test_probe_empty_input() {
        let (records, stats) = probe_paths(&[], &ProbeConfig::default());
        assert!(records.is_empty());
        assert_eq!(stats.input_paths, 0);
        assert!(stats.errors.is_empty());
    }

    #[test]
    fn test_probe_preserves_input_order() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (0..20)
            .map(|i| write_file(&dir, &format!("f{i:02}"), &vec![b'x'; i]))
            .collect();

        let (records, stats) = probe_paths(&paths, &ProbeConfig::default());

        assert_eq!(stats.probed_files, 20);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.index, i);
            assert_eq!(record.path, paths[i]);
            assert_eq!(record.size, i as u64);
        }
        assert_eq!(stats.total_size, (0..20u64).sum::<u64>());
    }

    #[test]
    fn test_probe_missing_path_is_warning() {
        let dir = TempDir::new().unwrap();
        let ok = write_file(&dir, "ok.txt", b"hello");
        let missing = dir.path().join("missing.txt");

        let (records, stats) = probe_paths(&[missing.clone(), ok.clone()], &ProbeConfig::default());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path, ok);
        assert_eq!(records[0].index, 1);
        assert_eq!(stats.errors.len(), 1);
        assert!(matches!(&stats.errors[0], ProbeError::NotFound(p) if *p == missing));
    }

    #[test]
    fn test_probe_directory_is_not_a_file() {
        let dir = TempDir::new().unwrap();
        let (records, stats) =
            probe_paths(&[dir.path().to_path_buf()], &ProbeConfig::default());

        assert!(records.is_empty());
        assert!(matches!(stats.errors[0], ProbeError::NotAFile(_)));
    }

    #[test]
    fn test_probe_repeated_path_collapsed() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"abc");
        let b = write_file(&dir, "b.txt", b"xyz");

        let (records, stats) =
            probe_paths(&[a.clone(), b.clone(), a.clone()], &ProbeConfig::default());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].index, 0);
        assert_eq!(records[1].index, 1);
        assert_eq!(stats.repeated_paths, 1);
    }

    #[test]
    fn test_probe_other_spelling_is_a_separate_input() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"abc");
        let dotted = dir.path().join(".").join("a.txt");

        let (records, stats) = probe_paths(&[a.clone(), dotted.clone()], &ProbeConfig::default());

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].path, a);
        assert_eq!(records[1].path, dotted);
        assert_eq!(stats.repeated_paths, 0);
    }

    #[test]
    fn test_probe_shutdown_flag() {
        let dir = TempDir::new().unwrap();
        let a = write_file(&dir, "a.txt", b"abc");

        let flag = Arc::new(AtomicBool::new(true));
        let config = ProbeConfig::default().with_shutdown_flag(flag);
        let (records, stats) = probe_paths(&[a], &config);

        assert!(records.is_empty());
        assert!(stats.interrupted);
    }
}
