//! Reporting policy.
//!
//! Decides which classified files are surfaced. A [`ReportConfig`] either
//! filters the classification down to a sorted path list or, in count mode,
//! hands back the full occurrence-count mapping.
//!
//! # Example
//!
//! ```no_run
//! use dupfilter::duplicates::Classifier;
//! use dupfilter::report::{self, DuplicateMode, Report, ReportConfig};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("a"), PathBuf::from("b")];
//! let classification = Classifier::with_defaults().classify(&paths).unwrap();
//!
//! // Files safe to delete: every duplicate except the first copy.
//! let config = ReportConfig {
//!     report_unique: false,
//!     report_duplicate: DuplicateMode::All,
//!     count_mode: false,
//! };
//! if let Report::Paths(paths) = report::apply(&classification, &config) {
//!     for path in paths {
//!         println!("{}", path.display());
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::duplicates::{Classification, ClassifiedFile};

/// Which members of a duplicate class are reported.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase", try_from = "DuplicateModeRepr")]
pub enum DuplicateMode {
    /// Exclude every file that has duplicates (0)
    #[value(alias = "0")]
    None,
    /// Include every member of every duplicate class (1)
    #[value(alias = "1")]
    All,
    /// Include only the first member of each duplicate class (2)
    #[default]
    #[value(alias = "2")]
    First,
}

/// Error for an unrecognised duplicate mode.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid duplicate mode '{0}' (expected none|all|first or 0|1|2)")]
pub struct InvalidDuplicateMode(pub String);

impl TryFrom<u8> for DuplicateMode {
    type Error = InvalidDuplicateMode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::All),
            2 => Ok(Self::First),
            other => Err(InvalidDuplicateMode(other.to_string())),
        }
    }
}

impl From<DuplicateMode> for u8 {
    fn from(mode: DuplicateMode) -> Self {
        match mode {
            DuplicateMode::None => 0,
            DuplicateMode::All => 1,
            DuplicateMode::First => 2,
        }
    }
}

impl FromStr for DuplicateMode {
    type Err = InvalidDuplicateMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "0" => Ok(Self::None),
            "all" | "1" => Ok(Self::All),
            "first" | "2" => Ok(Self::First),
            _ => Err(InvalidDuplicateMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for DuplicateMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::All => write!(f, "all"),
            Self::First => write!(f, "first"),
        }
    }
}

/// Config files may spell the mode as a name or as 0/1/2.
#[derive(Deserialize)]
#[serde(untagged)]
enum DuplicateModeRepr {
    Number(u8),
    Name(String),
}

impl TryFrom<DuplicateModeRepr> for DuplicateMode {
    type Error = InvalidDuplicateMode;

    fn try_from(repr: DuplicateModeRepr) -> Result<Self, Self::Error> {
        match repr {
            DuplicateModeRepr::Number(n) => Self::try_from(n),
            DuplicateModeRepr::Name(name) => name.parse(),
        }
    }
}

/// Reporting options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Include files whose content occurs once.
    pub report_unique: bool,
    /// Which members of duplicate classes to include.
    pub report_duplicate: DuplicateMode,
    /// Return the raw occurrence counts instead of a filtered list.
    pub count_mode: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            report_unique: true,
            report_duplicate: DuplicateMode::First,
            count_mode: false,
        }
    }
}

impl ReportConfig {
    /// Whether the filter can never select anything.
    #[must_use]
    pub fn selects_nothing(&self) -> bool {
        !self.count_mode && !self.report_unique && self.report_duplicate == DuplicateMode::None
    }

    fn includes(&self, classification: &Classification, file: &ClassifiedFile) -> bool {
        if file.is_unique() {
            return self.report_unique;
        }
        match self.report_duplicate {
            DuplicateMode::None => false,
            DuplicateMode::All => true,
            DuplicateMode::First => classification.is_representative(file),
        }
    }
}

/// Output of the reporting policy.
///
/// Both variants order paths by their raw bytes, the way `sort` does, and
/// key them by exact spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// Filtered paths, sorted
    Paths(Vec<PathBuf>),
    /// Occurrence count for every classified file
    Counts(BTreeMap<OsString, usize>),
}

impl Report {
    /// Number of entries in the report.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Paths(paths) => paths.len(),
            Self::Counts(counts) => counts.len(),
        }
    }

    /// Whether the report has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Apply the reporting policy to a classification.
#[must_use]
pub fn apply(classification: &Classification, config: &ReportConfig) -> Report {
    if config.count_mode {
        return Report::Counts(classification.occurrence_counts());
    }

    if config.selects_nothing() {
        log::debug!("Both unique and duplicate reporting are off; report is empty");
    }

    let mut paths: Vec<PathBuf> = classification
        .files
        .iter()
        .filter(|f| config.includes(classification, f))
        .map(|f| f.path.clone())
        .collect();
    paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

    log::debug!(
        "Report selected {} of {} classified files",
        paths.len(),
        classification.files.len()
    );

    Report::Paths(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::aggregate;
    use crate::scanner::FileRecord;
    use std::ffi::OsStr;

    /// [a="x", b="y", c="x", d="x", e="z"(size-unique)]
    fn sample() -> Classification {
        let x = [1u8; 32];
        let y = [2u8; 32];
        let hashed = vec![
            FileRecord::new(0, PathBuf::from("/d/a"), 1).with_digest(x),
            FileRecord::new(1, PathBuf::from("/c/b"), 1).with_digest(y),
            FileRecord::new(2, PathBuf::from("/b/c"), 1).with_digest(x),
            FileRecord::new(3, PathBuf::from("/a/d"), 1).with_digest(x),
        ];
        let unique = vec![FileRecord::new(4, PathBuf::from("/e"), 9)];
        let (files, hash_groups) = aggregate(unique, hashed);
        Classification {
            files,
            hash_groups,
            ..Default::default()
        }
    }

    fn paths(report: Report) -> Vec<String> {
        match report {
            Report::Paths(p) => p.iter().map(|p| p.display().to_string()).collect(),
            Report::Counts(_) => panic!("expected paths"),
        }
    }

    fn config(unique: bool, mode: DuplicateMode) -> ReportConfig {
        ReportConfig {
            report_unique: unique,
            report_duplicate: mode,
            count_mode: false,
        }
    }

    #[test]
    fn test_report_config_default() {
        let config = ReportConfig::default();
        assert!(config.report_unique);
        assert_eq!(config.report_duplicate, DuplicateMode::First);
        assert!(!config.count_mode);
    }

    #[test]
    fn test_default_reports_unique_and_representatives() {
        let report = apply(&sample(), &ReportConfig::default());
        assert_eq!(paths(report), vec!["/c/b", "/d/a", "/e"]);
    }

    #[test]
    fn test_all_duplicates() {
        let report = apply(&sample(), &config(true, DuplicateMode::All));
        assert_eq!(paths(report), vec!["/a/d", "/b/c", "/c/b", "/d/a", "/e"]);
    }

    #[test]
    fn test_no_duplicates() {
        let report = apply(&sample(), &config(true, DuplicateMode::None));
        assert_eq!(paths(report), vec!["/c/b", "/e"]);
    }

    #[test]
    fn test_duplicates_only() {
        let report = apply(&sample(), &config(false, DuplicateMode::All));
        assert_eq!(paths(report), vec!["/a/d", "/b/c", "/d/a"]);
    }

    #[test]
    fn test_representative_is_first_input_not_first_sorted() {
        let report = apply(&sample(), &config(false, DuplicateMode::First));
        assert_eq!(paths(report), vec!["/d/a"]);
    }

    #[test]
    fn test_everything_off_is_empty() {
        let cfg = config(false, DuplicateMode::None);
        assert!(cfg.selects_nothing());
        let report = apply(&sample(), &cfg);
        assert!(report.is_empty());
        assert_eq!(report, Report::Paths(Vec::new()));
    }

    #[test]
    fn test_count_mode_bypasses_filters() {
        let cfg = ReportConfig {
            report_unique: false,
            report_duplicate: DuplicateMode::None,
            count_mode: true,
        };
        let Report::Counts(counts) = apply(&sample(), &cfg) else {
            panic!("expected counts");
        };

        assert_eq!(counts.len(), 5);
        assert_eq!(counts[OsStr::new("/d/a")], 3);
        assert_eq!(counts[OsStr::new("/c/b")], 1);
        assert_eq!(counts[OsStr::new("/e")], 1);
        assert_eq!(counts.values().sum::<usize>(), 3 * 3 + 1 + 1);
    }

    #[test]
    fn test_sorted_by_path_bytes() {
        let unique = vec![
            FileRecord::new(0, PathBuf::from("/x/a/b"), 1),
            FileRecord::new(1, PathBuf::from("/x/a-b"), 2),
        ];
        let (files, hash_groups) = aggregate(unique, Vec::new());
        let classification = Classification {
            files,
            hash_groups,
            ..Default::default()
        };

        let report = apply(&classification, &ReportConfig::default());
        assert_eq!(paths(report), vec!["/x/a-b", "/x/a/b"]);

        let counting = ReportConfig {
            count_mode: true,
            ..ReportConfig::default()
        };
        let Report::Counts(counts) = apply(&classification, &counting) else {
            panic!("expected counts");
        };
        let keys: Vec<&OsStr> = counts.keys().map(OsString::as_os_str).collect();
        assert_eq!(keys, vec![OsStr::new("/x/a-b"), OsStr::new("/x/a/b")]);
    }

    #[test]
    fn test_duplicate_mode_conversions() {
        assert_eq!(DuplicateMode::try_from(0).unwrap(), DuplicateMode::None);
        assert_eq!(DuplicateMode::try_from(1).unwrap(), DuplicateMode::All);
        assert_eq!(DuplicateMode::try_from(2).unwrap(), DuplicateMode::First);
        assert!(DuplicateMode::try_from(3).is_err());
        assert_eq!(u8::from(DuplicateMode::All), 1);

        assert_eq!("FIRST".parse::<DuplicateMode>().unwrap(), DuplicateMode::First);
        assert_eq!("0".parse::<DuplicateMode>().unwrap(), DuplicateMode::None);
        assert!("some".parse::<DuplicateMode>().is_err());
        assert_eq!(DuplicateMode::All.to_string(), "all");
    }

    #[test]
    fn test_duplicate_mode_deserialize_name_or_number() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: DuplicateMode,
        }

        let w: Wrapper = serde_json::from_str(r#"{"mode": "all"}"#).unwrap();
        assert_eq!(w.mode, DuplicateMode::All);
        let w: Wrapper = serde_json::from_str(r#"{"mode": 0}"#).unwrap();
        assert_eq!(w.mode, DuplicateMode::None);
        assert!(serde_json::from_str::<Wrapper>(r#"{"mode": 7}"#).is_err());
    }
}
