//! Report formatters.
//!
//! - text: one path per line (or NUL-terminated), `count<TAB>path` for counts
//! - JSON for automation and scripting, with a summary object
//! - CSV for spreadsheet import
//!
//! # Example
//!
//! ```no_run
//! use dupfilter::duplicates::Classifier;
//! use dupfilter::error::ExitCode;
//! use dupfilter::output::{write_report, OutputFormat};
//! use dupfilter::report::{self, ReportConfig};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("a"), PathBuf::from("b")];
//! let classification = Classifier::with_defaults().classify(&paths).unwrap();
//! let report = report::apply(&classification, &ReportConfig::default());
//!
//! let mut stdout = std::io::stdout().lock();
//! write_report(
//!     &mut stdout,
//!     OutputFormat::Json,
//!     &report,
//!     &classification,
//!     ExitCode::Success,
//!     false,
//! )
//! .unwrap();
//! ```

pub mod csv;
pub mod json;
pub mod text;

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::duplicates::Classification;
use crate::error::ExitCode;
use crate::report::Report;

pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;
pub use self::text::TextOutput;

/// Report output format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain paths, one per line
    #[default]
    Text,
    /// JSON document with a summary
    Json,
    /// CSV with a header row
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Errors that can occur while writing a report.
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    /// I/O error during writing
    #[error("I/O error writing report: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
}

impl OutputError {
    /// Whether the reader went away (e.g. piped into `head`).
    #[must_use]
    pub fn is_broken_pipe(&self) -> bool {
        match self {
            Self::Io(e) => e.kind() == io::ErrorKind::BrokenPipe,
            Self::Json(e) => e.io_error_kind() == Some(io::ErrorKind::BrokenPipe),
            Self::Csv(e) => matches!(
                e.kind(),
                ::csv::ErrorKind::Io(inner) if inner.kind() == io::ErrorKind::BrokenPipe
            ),
        }
    }
}

/// Write `report` to `writer` in the chosen format.
///
/// `null` only affects text output, where it terminates entries with NUL.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_report<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    report: &Report,
    classification: &Classification,
    exit_code: ExitCode,
    null: bool,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Text => TextOutput::new(report).with_null(null).write_to(writer)?,
        OutputFormat::Json => {
            JsonOutput::new(report, classification, exit_code).write_to(writer, true)?;
        }
        OutputFormat::Csv => CsvOutput::new(report).write_to(&mut *writer)?,
    }
    writer.flush()?;
    Ok(())
}
