//! Content classification pipeline.
//!
//! # Overview
//!
//! This module orchestrates the classification of an explicit path list:
//! 1. **Probe**: stat every path and record its size (see [`crate::scanner::prober`])
//! 2. **Size grouping**: files with a size nobody else has are unique
//!    (see [`crate::duplicates::groups`])
//! 3. **Hash**: stream the full content of every file whose size is shared
//! 4. **Aggregate**: group hashed files by digest, in input order, and assign
//!    every file its occurrence count
//!
//! Per-file problems never abort a run. They are collected as
//! [`ClassifyWarning`]s on the returned [`Classification`] and the affected
//! files are absent from it.
//!
//! # Example
//!
//! ```no_run
//! use dupfilter::duplicates::{Classifier, ClassifierConfig};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("a.txt"), PathBuf::from("b.txt"), PathBuf::from("c.txt")];
//! let classifier = Classifier::new(ClassifierConfig::default());
//! let classification = classifier.classify(&paths).unwrap();
//!
//! for (path, count) in classification.occurrence_counts() {
//!     println!("{count}\t{}", path.to_string_lossy());
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::groups::{group_by_size, partition_by_ambiguity, HashGroup, SizeGroup};
use crate::progress::ProgressCallback;
use crate::scanner::{
    probe_paths, Digester, FileRecord, Hash, HashError, Hasher, ProbeConfig, ProbeError,
};

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Configuration for the classifier.
#[derive(Clone)]
pub struct ClassifierConfig {
    /// Number of I/O threads for probing and hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Content digest used for same-size files.
    pub digester: Arc<dyn Digester>,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("io_threads", &self.io_threads)
            .field("digester", &self.digester.name())
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            digester: Arc::new(crate::scanner::Blake3Digester),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl ClassifierConfig {
    /// Create a new configuration with custom I/O thread count.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the content digester.
    #[must_use]
    pub fn with_digester(mut self, digester: Arc<dyn Digester>) -> Self {
        self.digester = digester;
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

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            io_threads: self.io_threads,
            shutdown_flag: self.shutdown_flag.clone(),
            progress_callback: self.progress_callback.clone(),
        }
    }
}

/// Statistics from the hash phase.
#[derive(Debug, Default)]
pub struct HashStats {
    /// Total files that entered the hash phase
    pub input_files: usize,
    /// Number of files successfully hashed
    pub hashed_files: usize,
    /// Total bytes hashed across all files
    pub bytes_hashed: u64,
    /// Files that could not be read
    pub errors: Vec<HashError>,
    /// Whether phase was interrupted by shutdown
    pub interrupted: bool,
}

/// Hash every file of every ambiguous size group.
///
/// Returns the successfully hashed records sorted by input index, whatever
/// order the parallel reads completed in.
///
/// # Example
///
/// ```no_run
/// use dupfilter::duplicates::{group_by_size, hash_phase, partition_by_ambiguity, ClassifierConfig};
/// use dupfilter::scanner::{FileRecord, Hasher};
///
/// let files: Vec<FileRecord> = vec![];
/// let (groups, _) = group_by_size(files);
/// let (_, ambiguous) = partition_by_ambiguity(groups);
///
/// let (hashed, stats) = hash_phase(ambiguous, &Hasher::new(), &ClassifierConfig::default());
/// println!("{} files hashed, {} failed", stats.hashed_files, stats.errors.len());
/// ```
#[must_use]
pub fn hash_phase(
    ambiguous: Vec<SizeGroup>,
    hasher: &Hasher,
    config: &ClassifierConfig,
) -> (Vec<FileRecord>, HashStats) {
    let all_files: Vec<FileRecord> = ambiguous.into_iter().flat_map(|g| g.files).collect();
    let mut stats = HashStats {
        input_files: all_files.len(),
        ..Default::default()
    };

    if all_files.is_empty() {
        log::debug!("Hash phase: no files share a size");
        return (Vec::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("hash", all_files.len());
    }

    log::info!(
        "Hashing {} files with {}",
        all_files.len(),
        hasher.algorithm()
    );

    let results: Vec<(FileRecord, Option<Result<Hash, HashError>>)> =
        crate::scanner::install_io_pool(config.io_threads, || {
            all_files
                .into_par_iter()
                .enumerate()
                .map(|(n, file)| {
                    if config.is_shutdown_requested() {
                        return (file, None);
                    }

                    if file.size > LARGE_FILE_THRESHOLD {
                        log::debug!(
                            "Hashing large file ({} MB): {}",
                            file.size / (1024 * 1024),
                            file.path.display()
                        );
                    }

                    if let Some(ref callback) = config.progress_callback {
                        callback.on_progress(n + 1, file.path.to_string_lossy().as_ref());
                    }

                    let result = hasher.full_hash(&file.path);
                    if result.is_ok() {
                        if let Some(ref callback) = config.progress_callback {
                            callback.on_item_completed(file.size);
                        }
                    }
                    (file, Some(result))
                })
                .collect()
        });

    let mut hashed = Vec::with_capacity(results.len());
    for (file, result) in results {
        match result {
            Some(Ok(hash)) => {
                log::trace!(
                    "Hashed {}: {}",
                    file.path.display(),
                    crate::scanner::hash_to_hex(&hash)
                );
                stats.hashed_files += 1;
                stats.bytes_hashed += file.size;
                hashed.push(file.with_digest(hash));
            }
            Some(Err(HashError::Interrupted(_))) | None => stats.interrupted = true,
            Some(Err(e)) => {
                log::warn!("Failed to hash, excluding from results: {}", e);
                stats.errors.push(e);
            }
        }
    }

    hashed.sort_by_key(|f| f.index);

    if stats.interrupted {
        log::info!("Hash phase interrupted by shutdown signal");
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("hash");
    }

    log::info!(
        "Hash phase complete: {} of {} files hashed ({} bytes), {} failed",
        stats.hashed_files,
        stats.input_files,
        stats.bytes_hashed,
        stats.errors.len()
    );

    (hashed, stats)
}

/// A file whose content class is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFile {
    /// Position in the original input list
    pub index: usize,
    /// Path as supplied by the caller
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Number of files sharing this content, including this one
    pub count: usize,
    /// Index into [`Classification::hash_groups`], `None` if unique by size
    pub group: Option<usize>,
}

impl ClassifiedFile {
    /// Whether no other file shares this content.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.count == 1
    }
}

/// Build hash groups and occurrence counts.
///
/// `unique` holds files certified unique by size; `hashed` holds files with a
/// digest. Hashed files are grouped by `(size, digest)` in input order, so the
/// first member of each group is the earliest input file with that content.
/// The returned files are sorted by input index.
#[must_use]
pub fn aggregate(
    unique: Vec<FileRecord>,
    mut hashed: Vec<FileRecord>,
) -> (Vec<ClassifiedFile>, Vec<HashGroup>) {
    hashed.sort_by_key(|f| f.index);

    let mut groups: Vec<HashGroup> = Vec::new();
    let mut slots: HashMap<(u64, Hash), usize> = HashMap::new();
    let mut membership: Vec<(usize, usize)> = Vec::with_capacity(hashed.len());

    for file in hashed {
        let Some(hash) = file.digest else {
            log::debug!("Record without digest in hash aggregation: {}", file.path.display());
            continue;
        };
        let slot = *slots.entry((file.size, hash)).or_insert_with(|| {
            groups.push(HashGroup {
                hash,
                size: file.size,
                files: Vec::new(),
            });
            groups.len() - 1
        });
        membership.push((slot, groups[slot].files.len()));
        groups[slot].files.push(file);
    }

    let mut files: Vec<ClassifiedFile> = Vec::with_capacity(unique.len() + membership.len());
    files.extend(unique.into_iter().map(|f| ClassifiedFile {
        index: f.index,
        path: f.path,
        size: f.size,
        count: 1,
        group: None,
    }));
    for (slot, member) in membership {
        let group = &groups[slot];
        let record = &group.files[member];
        files.push(ClassifiedFile {
            index: record.index,
            path: record.path.clone(),
            size: record.size,
            count: group.len(),
            group: Some(slot),
        });
    }
    files.sort_by_key(|f| f.index);

    for group in groups.iter().filter(|g| g.len() > 1) {
        log::debug!(
            "Content class {}: {} files, {} bytes each",
            group.hash_hex(),
            group.len(),
            group.size
        );
    }

    (files, groups)
}

/// A recoverable per-file problem; the file is absent from all results.
#[derive(thiserror::Error, Debug)]
pub enum ClassifyWarning {
    /// The path could not be examined.
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// The file could not be read while hashing.
    #[error(transparent)]
    Read(#[from] HashError),
}

impl ClassifyWarning {
    /// The path this warning refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Probe(e) => e.path(),
            Self::Read(e) => e.path(),
        }
    }
}

/// Summary statistics from one classification run.
#[derive(Debug, Clone, Default)]
pub struct ClassifySummary {
    /// Number of paths supplied
    pub input_paths: usize,
    /// Number of files that received an occurrence count
    pub classified_files: usize,
    /// Number of paths skipped because of warnings
    pub skipped_files: usize,
    /// Files with count = 1
    pub unique_files: usize,
    /// Files with count > 1
    pub duplicate_files: usize,
    /// Content classes with more than one member
    pub duplicate_classes: usize,
    /// Files resolved by size alone
    pub unique_by_size: usize,
    /// Files that had to be hashed successfully
    pub hashed_files: usize,
    /// Total bytes read while hashing
    pub bytes_hashed: u64,
    /// Total size of all classified files
    pub total_size: u64,
    /// Bytes freed by keeping only one copy of each class
    pub reclaimable_space: u64,
    /// Digest algorithm name
    pub algorithm: &'static str,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl ClassifySummary {
    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize::b(self.total_size).to_string()
    }
}

/// Result of one classification run.
#[derive(Debug, Default)]
pub struct Classification {
    /// Classified files in input order
    pub files: Vec<ClassifiedFile>,
    /// Content classes of hashed files, ordered by first member
    pub hash_groups: Vec<HashGroup>,
    /// Per-file problems, in the order they were found
    pub warnings: Vec<ClassifyWarning>,
    /// Summary statistics
    pub summary: ClassifySummary,
}

impl Classification {
    /// Occurrence count for every classified file, keyed by the path exactly
    /// as it was given.
    #[must_use]
    pub fn occurrence_counts(&self) -> BTreeMap<OsString, usize> {
        self.files
            .iter()
            .map(|f| (f.path.clone().into_os_string(), f.count))
            .collect()
    }

    /// Look up a classified file by its exact path spelling.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&ClassifiedFile> {
        self.files
            .iter()
            .find(|f| f.path.as_os_str() == path.as_os_str())
    }

    /// The earliest input file sharing `file`'s content (the file itself when unique).
    #[must_use]
    pub fn representative<'a>(&'a self, file: &'a ClassifiedFile) -> &'a Path {
        file.group
            .and_then(|g| self.hash_groups.get(g))
            .and_then(HashGroup::representative)
            .map_or(file.path.as_path(), |r| r.path.as_path())
    }

    /// Whether `file` is the representative of its content class.
    #[must_use]
    pub fn is_representative(&self, file: &ClassifiedFile) -> bool {
        file.group
            .and_then(|g| self.hash_groups.get(g))
            .and_then(HashGroup::representative)
            .is_none_or(|r| r.index == file.index)
    }

    /// Content classes with more than one member.
    pub fn duplicate_groups(&self) -> impl Iterator<Item = &HashGroup> {
        self.hash_groups.iter().filter(|g| g.len() > 1)
    }

    /// Whether any file was skipped.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Errors that abort a classification run.
#[derive(thiserror::Error, Debug)]
pub enum ClassifyError {
    /// The input path list was empty.
    #[error("No files specified")]
    NoFiles,

    /// The run was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Classification interrupted by user")]
    Interrupted,
}

/// Classifier that runs the probe → size → hash → aggregate pipeline.
///
/// # Example
///
/// ```no_run
/// use dupfilter::duplicates::{Classifier, ClassifierConfig};
/// use std::path::PathBuf;
///
/// let config = ClassifierConfig::default().with_io_threads(8);
/// let classifier = Classifier::new(config);
///
/// let paths = vec![PathBuf::from("a"), PathBuf::from("b")];
/// match classifier.classify(&paths) {
///     Ok(result) => println!("{} duplicate classes", result.summary.duplicate_classes),
///     Err(e) => eprintln!("Classification failed: {}", e),
/// }
/// ```
pub struct Classifier {
    config: ClassifierConfig,
    hasher: Hasher,
}

impl Classifier {
    /// Create a new classifier with the given configuration.
    #[must_use]
    pub fn new(config: ClassifierConfig) -> Self {
        let mut hasher = Hasher::with_digester(config.digester.clone());
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self { config, hasher }
    }

    /// Create a new classifier with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ClassifierConfig::default())
    }

    /// Classify `paths` by content.
    ///
    /// # Errors
    ///
    /// Returns `ClassifyError::NoFiles` if `paths` is empty (no file is
    /// touched), or `ClassifyError::Interrupted` if the shutdown flag was
    /// raised. Every other problem is a warning on the result.
    pub fn classify(&self, paths: &[PathBuf]) -> Result<Classification, ClassifyError> {
        if paths.is_empty() {
            return Err(ClassifyError::NoFiles);
        }
        if self.config.is_shutdown_requested() {
            return Err(ClassifyError::Interrupted);
        }

        let start_time = Instant::now();
        log::info!("Classifying {} paths", paths.len());

        let (records, probe_stats) = probe_paths(paths, &self.config.probe_config());
        if probe_stats.interrupted || self.config.is_shutdown_requested() {
            return Err(ClassifyError::Interrupted);
        }

        let (size_groups, size_stats) = group_by_size(records);
        let (unique, ambiguous) = partition_by_ambiguity(size_groups);

        let (hashed, hash_stats) = hash_phase(ambiguous, &self.hasher, &self.config);
        if hash_stats.interrupted || self.config.is_shutdown_requested() {
            return Err(ClassifyError::Interrupted);
        }

        let (files, hash_groups) = aggregate(unique, hashed);

        let mut warnings: Vec<ClassifyWarning> = probe_stats
            .errors
            .into_iter()
            .map(ClassifyWarning::from)
            .collect();
        warnings.extend(hash_stats.errors.into_iter().map(ClassifyWarning::from));

        let duplicate_groups: Vec<&HashGroup> =
            hash_groups.iter().filter(|g| g.len() > 1).collect();
        let summary = ClassifySummary {
            input_paths: paths.len(),
            classified_files: files.len(),
            skipped_files: warnings.len(),
            unique_files: files.iter().filter(|f| f.is_unique()).count(),
            duplicate_files: files.iter().filter(|f| !f.is_unique()).count(),
            duplicate_classes: duplicate_groups.len(),
            unique_by_size: size_stats.unique_by_size,
            hashed_files: hash_stats.hashed_files,
            bytes_hashed: hash_stats.bytes_hashed,
            total_size: files.iter().map(|f| f.size).sum(),
            reclaimable_space: duplicate_groups
                .iter()
                .map(|g| g.size * (g.len() as u64 - 1))
                .sum(),
            algorithm: self.hasher.algorithm(),
            duration: start_time.elapsed(),
        };

        log::info!(
            "Classification complete: {} unique, {} duplicates in {} classes, {} reclaimable, {} skipped",
            summary.unique_files,
            summary.duplicate_files,
            summary.duplicate_classes,
            summary.reclaimable_display(),
            summary.skipped_files
        );

        Ok(Classification {
            files,
            hash_groups,
            warnings,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{self, Read};
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    fn create_test_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn record(dir: &TempDir, index: usize, name: &str, content: &[u8]) -> FileRecord {
        let path = create_test_file(dir, name, content);
        FileRecord::new(index, path, content.len() as u64)
    }

    /// Digester that refuses any stream equal to `poison`.
    struct PoisonDigester {
        poison: Vec<u8>,
    }

    impl Digester for PoisonDigester {
        fn name(&self) -> &'static str {
            "poison"
        }

        fn digest(&self, reader: &mut dyn Read) -> io::Result<Hash> {
            let mut content = Vec::new();
            reader.read_to_end(&mut content)?;
            if content == self.poison {
                return Err(io::Error::new(io::ErrorKind::InvalidData, "unreadable"));
            }
            Ok(*blake3::hash(&content).as_bytes())
        }
    }

    #[test]
    fn test_classifier_config_default() {
        let config = ClassifierConfig::default();
        assert_eq!(config.io_threads, 4);
        assert_eq!(config.digester.name(), "blake3");
        assert!(config.shutdown_flag.is_none());
        assert!(config.progress_callback.is_none());
    }

    #[test]
    fn test_classifier_config_io_threads_min() {
        let config = ClassifierConfig::default().with_io_threads(0);
        assert_eq!(config.io_threads, 1);
    }

    #[test]
    fn test_hash_phase_empty_input() {
        let (hashed, stats) = hash_phase(Vec::new(), &Hasher::new(), &ClassifierConfig::default());
        assert!(hashed.is_empty());
        assert_eq!(stats.input_files, 0);
    }

    #[test]
    fn test_hash_phase_sorted_by_index() {
        let dir = TempDir::new().unwrap();
        let mut g1 = SizeGroup::new(3);
        g1.add(record(&dir, 4, "e", b"aaa"));
        g1.add(record(&dir, 1, "b", b"bbb"));
        let mut g2 = SizeGroup::new(2);
        g2.add(record(&dir, 0, "a", b"cc"));
        g2.add(record(&dir, 3, "d", b"dd"));

        let (hashed, stats) =
            hash_phase(vec![g1, g2], &Hasher::new(), &ClassifierConfig::default());

        let order: Vec<usize> = hashed.iter().map(|f| f.index).collect();
        assert_eq!(order, vec![0, 1, 3, 4]);
        assert!(hashed.iter().all(|f| f.digest.is_some()));
        assert_eq!(stats.hashed_files, 4);
        assert_eq!(stats.bytes_hashed, 10);
    }

    #[test]
    fn test_hash_phase_handles_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut group = SizeGroup::new(12);
        group.add(record(&dir, 0, "exists.txt", b"real content"));
        group.add(FileRecord::new(1, dir.path().join("missing.txt"), 12));

        let (hashed, stats) =
            hash_phase(vec![group], &Hasher::new(), &ClassifierConfig::default());

        assert_eq!(hashed.len(), 1);
        assert_eq!(stats.hashed_files, 1);
        assert_eq!(stats.errors.len(), 1);
        assert!(matches!(stats.errors[0], HashError::NotFound(_)));
    }

    #[test]
    fn test_hash_phase_shutdown_flag() {
        let dir = TempDir::new().unwrap();
        let mut group = SizeGroup::new(7);
        group.add(record(&dir, 0, "file1.txt", b"content"));
        group.add(record(&dir, 1, "file2.txt", b"content"));

        let config =
            ClassifierConfig::default().with_shutdown_flag(Arc::new(AtomicBool::new(true)));
        let (_, stats) = hash_phase(vec![group], &Hasher::new(), &config);

        assert!(stats.interrupted);
    }

    #[test]
    fn test_aggregate_counts_and_order() {
        let a = FileRecord::new(0, PathBuf::from("/a"), 1).with_digest([1; 32]);
        let b = FileRecord::new(1, PathBuf::from("/b"), 5);
        let c = FileRecord::new(2, PathBuf::from("/c"), 1).with_digest([1; 32]);
        let d = FileRecord::new(3, PathBuf::from("/d"), 1).with_digest([2; 32]);

        // Hashed records arrive out of order.
        let (files, groups) = aggregate(vec![b], vec![d, c, a]);

        let summary: Vec<(&str, usize)> = files
            .iter()
            .map(|f| (f.path.to_str().unwrap(), f.count))
            .collect();
        assert_eq!(summary, vec![("/a", 2), ("/b", 1), ("/c", 2), ("/d", 1)]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].representative().unwrap().path, PathBuf::from("/a"));
        assert_eq!(groups[0].len(), 2);
        assert_eq!(files[1].group, None);
    }

    #[test]
    fn test_aggregate_same_digest_different_size_not_merged() {
        let a = FileRecord::new(0, PathBuf::from("/a"), 1).with_digest([9; 32]);
        let b = FileRecord::new(1, PathBuf::from("/b"), 2).with_digest([9; 32]);

        let (files, groups) = aggregate(Vec::new(), vec![a, b]);
        assert_eq!(groups.len(), 2);
        assert!(files.iter().all(ClassifiedFile::is_unique));
    }

    #[test]
    fn test_classify_empty_input_is_error() {
        let result = Classifier::with_defaults().classify(&[]);
        assert!(matches!(result, Err(ClassifyError::NoFiles)));
    }

    #[test]
    fn test_classify_empty_input_no_io() {
        let calls = Arc::new(AtomicUsize::new(0));

        struct Counting(Arc<AtomicUsize>);
        impl ProgressCallback for Counting {
            fn on_phase_start(&self, _phase: &str, _total: usize) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
            fn on_progress(&self, _current: usize, _path: &str) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
            fn on_phase_end(&self, _phase: &str) {}
        }

        let config =
            ClassifierConfig::default().with_progress_callback(Arc::new(Counting(calls.clone())));
        let result = Classifier::new(config).classify(&[]);

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_classify_basic_scenario() {
        let dir = TempDir::new().unwrap();
        let a = create_test_file(&dir, "a", b"x");
        let b = create_test_file(&dir, "b", b"yy");
        let c = create_test_file(&dir, "c", b"x");

        let result = Classifier::with_defaults()
            .classify(&[a.clone(), b.clone(), c.clone()])
            .unwrap();

        let counts = result.occurrence_counts();
        assert_eq!(counts[a.as_os_str()], 2);
        assert_eq!(counts[b.as_os_str()], 1);
        assert_eq!(counts[c.as_os_str()], 2);

        let file_c = result.get(&c).unwrap();
        assert_eq!(result.representative(file_c), a.as_path());
        assert!(!result.is_representative(file_c));
        assert!(result.is_representative(result.get(&a).unwrap()));
        assert!(result.is_representative(result.get(&b).unwrap()));

        assert_eq!(result.summary.duplicate_classes, 1);
        assert_eq!(result.summary.duplicate_files, 2);
        assert_eq!(result.summary.unique_files, 1);
        assert_eq!(result.summary.reclaimable_space, 1);
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_classify_singleton_sizes_not_hashed() {
        let dir = TempDir::new().unwrap();
        let a = create_test_file(&dir, "a", b"1");
        let b = create_test_file(&dir, "b", b"22");

        let result = Classifier::with_defaults().classify(&[a, b]).unwrap();

        assert_eq!(result.summary.hashed_files, 0);
        assert_eq!(result.summary.unique_by_size, 2);
        assert!(result.hash_groups.is_empty());
    }

    #[test]
    fn test_classify_unreadable_file_excluded() {
        let dir = TempDir::new().unwrap();
        let good1 = create_test_file(&dir, "good1", b"same!");
        let bad = create_test_file(&dir, "bad", b"BAD!!");
        let good2 = create_test_file(&dir, "good2", b"same!");

        let config = ClassifierConfig::default().with_digester(Arc::new(PoisonDigester {
            poison: b"BAD!!".to_vec(),
        }));
        let result = Classifier::new(config)
            .classify(&[good1.clone(), bad.clone(), good2.clone()])
            .unwrap();

        let counts = result.occurrence_counts();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[good1.as_os_str()], 2);
        assert_eq!(counts[good2.as_os_str()], 2);
        assert!(!counts.contains_key(bad.as_os_str()));

        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path(), bad.as_path());
        assert!(matches!(result.warnings[0], ClassifyWarning::Read(_)));
    }

    #[test]
    fn test_classify_missing_path_warning() {
        let dir = TempDir::new().unwrap();
        let a = create_test_file(&dir, "a", b"abc");
        let missing = dir.path().join("nope");

        let result = Classifier::with_defaults()
            .classify(&[missing.clone(), a.clone()])
            .unwrap();

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].index, 1);
        assert!(matches!(result.warnings[0], ClassifyWarning::Probe(_)));
        assert_eq!(result.summary.skipped_files, 1);
    }

    #[test]
    fn test_classify_shutdown_flag() {
        let dir = TempDir::new().unwrap();
        let a = create_test_file(&dir, "a", b"abc");

        let config =
            ClassifierConfig::default().with_shutdown_flag(Arc::new(AtomicBool::new(true)));
        let result = Classifier::new(config).classify(&[a]);

        assert!(matches!(result, Err(ClassifyError::Interrupted)));
    }

    #[test]
    fn test_classify_error_display() {
        assert_eq!(ClassifyError::NoFiles.to_string(), "No files specified");
        assert_eq!(
            ClassifyError::Interrupted.to_string(),
            "Classification interrupted by user"
        );
    }
}
