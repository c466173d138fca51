//! dupfilter - Content-based file filter
//!
//! Given an explicit list of files, dupfilter works out which of them share
//! byte-identical content and reports a filtered subset: unique files, the
//! first copy of each duplicate, every copy, or raw occurrence counts.
//!
//! Files are grouped by size first. Only sizes shared by two or more files are
//! read and hashed, so most inputs are classified with a single `stat`.
//!
//! # Example
//!
//! ```no_run
//! use dupfilter::classify_and_report;
//! use dupfilter::duplicates::ClassifierConfig;
//! use dupfilter::report::{Report, ReportConfig};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")];
//! let (report, _) =
//!     classify_and_report(&paths, &ClassifierConfig::default(), &ReportConfig::default())
//!         .unwrap();
//! if let Report::Paths(paths) = report {
//!     for path in paths {
//!         println!("{}", path.display());
//!     }
//! }
//! ```

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod signal;

use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::{Classification, Classifier, ClassifierConfig, ClassifyError};
use crate::error::ExitCode;
use crate::progress::Progress;
use crate::report::{Report, ReportConfig};

/// Classify `paths` and apply the reporting policy in one call.
///
/// # Errors
///
/// Returns `ClassifyError::NoFiles` for an empty list (before any I/O) and
/// `ClassifyError::Interrupted` if the shutdown flag was raised.
pub fn classify_and_report(
    paths: &[PathBuf],
    classifier: &ClassifierConfig,
    report_config: &ReportConfig,
) -> Result<(Report, Classification), ClassifyError> {
    let classification = Classifier::new(classifier.clone()).classify(paths)?;
    let report = report::apply(&classification, report_config);
    Ok((report, classification))
}

/// Read a path list, one entry per `separator`-terminated record.
///
/// Empty records are skipped and a trailing `\r` is stripped from
/// newline-separated lists.
///
/// # Errors
///
/// Returns an error if reading fails.
pub fn read_path_list<R: BufRead>(reader: R, separator: u8) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for record in reader.split(separator) {
        let mut record = record?;
        if separator == b'\n' && record.last() == Some(&b'\r') {
            record.pop();
        }
        if record.is_empty() {
            continue;
        }
        paths.push(bytes_to_path(record));
    }
    Ok(paths)
}

#[cfg(unix)]
fn bytes_to_path(bytes: Vec<u8>) -> PathBuf {
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(std::ffi::OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
}

/// Positional paths followed by those from `--from-file`.
fn collect_paths(cli: &Cli) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = cli.paths.clone();

    if let Some(ref list) = cli.from_file {
        let separator = if cli.null { b'\0' } else { b'\n' };
        let extra = if list.as_os_str() == "-" {
            read_path_list(io::stdin().lock(), separator)
                .context("Failed to read path list from stdin")?
        } else {
            let file = File::open(list)
                .with_context(|| format!("Failed to open path list {}", list.display()))?;
            read_path_list(BufReader::new(file), separator)
                .with_context(|| format!("Failed to read path list {}", list.display()))?
        };
        log::debug!("Read {} paths from {}", extra.len(), list.display());
        paths.extend(extra);
    }

    Ok(paths)
}

/// Run the command-line application.
///
/// The report goes to stdout; diagnostics and progress go to stderr.
///
/// # Errors
///
/// Returns an error for configuration problems, an empty path list, an
/// interrupted run, or a failure writing the report.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);

    let config = Config::load(cli.config.as_deref())?.with_cli(&cli);
    config.validate()?;
    log::debug!("Effective configuration: {:?}", config);

    if cli.print_config {
        let mut stdout = io::stdout().lock();
        stdout.write_all(config.to_toml()?.as_bytes())?;
        stdout.flush()?;
        return Ok(ExitCode::Success);
    }

    let paths = collect_paths(&cli)?;

    let handler = signal::install_handler()?;
    let mut classifier_config = config
        .classifier_config()
        .with_shutdown_flag(handler.get_flag());

    let show_progress = !cli.quiet && !cli.no_progress && io::stderr().is_terminal();
    if show_progress {
        classifier_config = classifier_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let (report, classification) =
        classify_and_report(&paths, &classifier_config, &config.report_config())?;

    let exit_code = if classification.has_warnings() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    };

    let mut stdout = io::BufWriter::new(io::stdout().lock());
    match output::write_report(
        &mut stdout,
        config.output,
        &report,
        &classification,
        exit_code,
        cli.null,
    ) {
        Ok(()) => {}
        Err(e) if e.is_broken_pipe() => log::debug!("Output closed early: {}", e),
        Err(e) => return Err(e).context("Failed to write report"),
    }

    let summary = &classification.summary;
    log::info!(
        "{} files classified in {:.2?}: {} unique, {} duplicates in {} classes, {} reclaimable",
        summary.classified_files,
        summary.duration,
        summary.unique_files,
        summary.duplicate_files,
        summary.duplicate_classes,
        summary.reclaimable_display()
    );
    if exit_code == ExitCode::PartialSuccess {
        log::warn!(
            "{} of {} paths skipped",
            summary.skipped_files,
            summary.input_paths
        );
    }

    Ok(exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::Path;

    #[test]
    fn test_read_path_list_lines() {
        let input = Cursor::new("a.txt\n\nb c.txt\r\n/abs/d\n");
        let paths = read_path_list(input, b'\n').unwrap();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b c.txt"),
                PathBuf::from("/abs/d")
            ]
        );
    }

    #[test]
    fn test_read_path_list_nul_separated() {
        let input = Cursor::new(b"with\nnewline\0plain\0".to_vec());
        let paths = read_path_list(input, b'\0').unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], Path::new("with\nnewline"));
        assert_eq!(paths[1], Path::new("plain"));
    }

    #[test]
    fn test_read_path_list_empty() {
        assert!(read_path_list(Cursor::new(""), b'\n').unwrap().is_empty());
    }

    #[test]
    fn test_classify_and_report_empty_is_error() {
        let result =
            classify_and_report(&[], &ClassifierConfig::default(), &ReportConfig::default());
        assert!(matches!(result, Err(ClassifyError::NoFiles)));
    }
}
