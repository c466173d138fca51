//! JSON report output.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "files": ["/path/a.txt", "/path/b.txt"],
//!   "summary": {
//!     "input_paths": 3,
//!     "classified_files": 3,
//!     "skipped_files": 0,
//!     "unique_files": 1,
//!     "duplicate_files": 2,
//!     "duplicate_classes": 1,
//!     "unique_by_size": 1,
//!     "hashed_files": 2,
//!     "bytes_hashed": 2048,
//!     "total_size": 3072,
//!     "reclaimable_space": 1024,
//!     "algorithm": "blake3",
//!     "duration_ms": 12,
//!     "exit_code": 0,
//!     "exit_code_name": "DF000"
//!   },
//!   "warnings": []
//! }
//! ```
//!
//! In count mode `files` is replaced by `"counts": {"/path/a.txt": 2, ...}`.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use super::OutputError;
use crate::duplicates::{Classification, ClassifySummary, ClassifyWarning};
use crate::error::ExitCode;
use crate::report::Report;

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Number of paths supplied
    pub input_paths: usize,
    /// Number of files that received an occurrence count
    pub classified_files: usize,
    /// Number of paths skipped with a warning
    pub skipped_files: usize,
    /// Files whose content occurs once
    pub unique_files: usize,
    /// Files whose content occurs more than once
    pub duplicate_files: usize,
    /// Content classes with more than one member
    pub duplicate_classes: usize,
    /// Files resolved by size without being read
    pub unique_by_size: usize,
    /// Files read in full
    pub hashed_files: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Total size of classified files in bytes
    pub total_size: u64,
    /// Bytes freed by keeping one copy per class
    pub reclaimable_space: u64,
    /// Digest algorithm
    pub algorithm: String,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DF000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Flatten run statistics and the exit code the binary will return.
    #[must_use]
    pub fn from_summary(summary: &ClassifySummary, exit_code: ExitCode) -> Self {
        Self {
            input_paths: summary.input_paths,
            classified_files: summary.classified_files,
            skipped_files: summary.skipped_files,
            unique_files: summary.unique_files,
            duplicate_files: summary.duplicate_files,
            duplicate_classes: summary.duplicate_classes,
            unique_by_size: summary.unique_by_size,
            hashed_files: summary.hashed_files,
            bytes_hashed: summary.bytes_hashed,
            total_size: summary.total_size,
            reclaimable_space: summary.reclaimable_space,
            algorithm: summary.algorithm.to_string(),
            duration_ms: u64::try_from(summary.duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// A skipped path and why.
#[derive(Debug, Clone, Serialize)]
pub struct JsonWarning {
    /// Path as given (lossy for non-UTF-8)
    pub path: String,
    /// Human-readable reason
    pub message: String,
}

impl From<&ClassifyWarning> for JsonWarning {
    fn from(warning: &ClassifyWarning) -> Self {
        Self {
            path: warning.path().to_string_lossy().into_owned(),
            message: warning.to_string(),
        }
    }
}

/// Complete JSON document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Selected paths, sorted (list mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    /// Occurrence count per path (count mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<BTreeMap<String, usize>>,
    /// Run statistics
    pub summary: JsonSummary,
    /// Paths left out of the report, or whose count could not be keyed
    pub warnings: Vec<JsonWarning>,
}

impl JsonOutput {
    /// Build the document for a report and the classification it came from.
    #[must_use]
    pub fn new(report: &Report, classification: &Classification, exit_code: ExitCode) -> Self {
        let mut warnings: Vec<JsonWarning> =
            classification.warnings.iter().map(JsonWarning::from).collect();

        let (files, counts) = match report {
            Report::Paths(paths) => (
                Some(
                    paths
                        .iter()
                        .map(|p| p.to_string_lossy().into_owned())
                        .collect(),
                ),
                None,
            ),
            Report::Counts(counts) => {
                // JSON keys must be UTF-8; distinct non-UTF-8 paths can collide.
                let mut keyed = BTreeMap::new();
                for (path, count) in counts {
                    let key = path.to_string_lossy().into_owned();
                    if keyed.contains_key(&key) {
                        log::warn!("Count for non-UTF-8 path {:?} dropped from JSON output", path);
                        warnings.push(JsonWarning {
                            path: key,
                            message: format!(
                                "Count for non-UTF-8 path {path:?} collides with another entry"
                            ),
                        });
                        continue;
                    }
                    keyed.insert(key, *count);
                }
                (None, Some(keyed))
            }
        };

        Self {
            files,
            counts,
            summary: JsonSummary::from_summary(&classification.summary, exit_code),
            warnings,
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), OutputError> {
        if pretty {
            serde_json::to_writer_pretty(&mut *writer, self)?;
        } else {
            serde_json::to_writer(&mut *writer, self)?;
        }
        writer.write_all(b"\n")?;
        Ok(())
    }
}
