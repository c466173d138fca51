//! Logging setup.
//!
//! Diagnostics go through the `log` facade to stderr via `env_logger`, so they
//! never mix with the report on stdout. The level comes from, in order:
//!
//! 1. `RUST_LOG` (if set)
//! 2. `--quiet` (errors only) or `--verbose` (debug, then trace)
//! 3. Default: warnings, so skipped files are visible without asking
//!
//! ```rust,no_run
//! use dupfilter::logging::init_logging;
//!
//! init_logging(1, false, false);
//! log::debug!("visible with -v");
//! ```

use env_logger::{Builder, WriteStyle};
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the global logger from CLI flags.
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_logging(verbose: u8, quiet: bool, no_color: bool) {
    let from_env = env::var("RUST_LOG").ok();

    let mut builder = Builder::new();
    match from_env {
        Some(ref spec) => {
            builder.parse_filters(spec);
        }
        None => {
            builder.filter_level(determine_level(verbose, quiet));
        }
    }

    if no_color {
        builder.write_style(WriteStyle::Never);
    }

    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        if verbose >= 2 {
            writeln!(
                buf,
                "{} {style}{:<5}{style:#} [{}] {}",
                buf.timestamp_millis(),
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(buf, "{style}{:<5}{style:#} {}", level, record.args())
        }
    });

    if builder.try_init().is_ok() {
        log::debug!(
            "Logging initialized at level {} (RUST_LOG: {:?})",
            current_level_name(),
            from_env
        );
    }
}

/// Map CLI verbosity to a level filter. Quiet wins over verbose.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Name of the active maximum log level.
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_level_default() {
        assert_eq!(determine_level(0, false), LevelFilter::Warn);
    }

    #[test]
    fn test_determine_level_verbose_steps() {
        assert_eq!(determine_level(1, false), LevelFilter::Info);
        assert_eq!(determine_level(2, false), LevelFilter::Debug);
        assert_eq!(determine_level(3, false), LevelFilter::Trace);
        assert_eq!(determine_level(9, false), LevelFilter::Trace);
    }

    #[test]
    fn test_determine_level_quiet_overrides_verbose() {
        assert_eq!(determine_level(0, true), LevelFilter::Error);
        assert_eq!(determine_level(2, true), LevelFilter::Error);
    }

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging(0, true, true);
        init_logging(2, false, false);
    }

    #[test]
    fn test_current_level_name_values() {
        let name = current_level_name();
        assert!(["off", "error", "warn", "info", "debug", "trace"].contains(&name));
    }
}
