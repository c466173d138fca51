//! Command-line interface definitions for dupfilter.
//!
//! # Example
//!
//! ```bash
//! # Unique files plus one copy of each duplicate (default)
//! dupfilter a.txt b.txt c.txt
//!
//! # Every redundant copy, ready for deletion
//! find . -type f -print0 | xargs -0 dupfilter --no-unique -d all
//!
//! # Occurrence counts as JSON
//! dupfilter --count --output json *.jpg
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::output::OutputFormat;
use crate::report::DuplicateMode;
use crate::scanner::DigestAlgorithm;

/// Filter a list of files by content duplication.
///
/// Files are grouped by size first; only files sharing a size are read and
/// hashed. By default every unique file and the first copy of each duplicate
/// are printed.
#[derive(Debug, Parser)]
#[command(name = "dupfilter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files to classify
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Read additional paths from FILE, one per line ("-" for stdin)
    #[arg(long, value_name = "FILE")]
    pub from_file: Option<PathBuf>,

    /// Report files whose content occurs once
    #[arg(short = 'u', long, overrides_with = "no_unique")]
    pub unique: bool,

    /// Do not report files whose content occurs once
    #[arg(short = 'U', long, overrides_with = "unique")]
    pub no_unique: bool,

    /// Which copies of duplicated content to report: none (0), all (1), first (2)
    #[arg(short, long, value_enum, value_name = "MODE")]
    pub duplicates: Option<DuplicateMode>,

    /// Report every copy of duplicated content (same as -d all)
    #[arg(short = 'D', long, conflicts_with_all = ["duplicates", "no_duplicates"])]
    pub all_duplicates: bool,

    /// Report no copy of duplicated content (same as -d none)
    #[arg(short = 'n', long, conflicts_with = "duplicates")]
    pub no_duplicates: bool,

    /// Print the occurrence count of every file instead of filtering
    #[arg(short, long)]
    pub count: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Terminate text output entries with NUL instead of newline
    #[arg(short = '0', long)]
    pub null: bool,

    /// Content digest for same-size files
    #[arg(long, value_enum)]
    pub algorithm: Option<DigestAlgorithm>,

    /// Number of I/O threads for probing and hashing (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub io_threads: Option<u16>,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Increase verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress everything except errors and the report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// `report_unique` requested on the command line, if any.
    #[must_use]
    pub fn report_unique(&self) -> Option<bool> {
        if self.no_unique {
            Some(false)
        } else if self.unique {
            Some(true)
        } else {
            None
        }
    }

    /// `report_duplicate` requested on the command line, if any.
    #[must_use]
    pub fn report_duplicate(&self) -> Option<DuplicateMode> {
        if self.all_duplicates {
            Some(DuplicateMode::All)
        } else if self.no_duplicates {
            Some(DuplicateMode::None)
        } else {
            self.duplicates
        }
    }

    /// `count_mode` requested on the command line, if any.
    #[must_use]
    pub fn count_mode(&self) -> Option<bool> {
        self.count.then_some(true)
    }
}
