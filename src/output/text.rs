//! Plain-text report output.
//!
//! Paths are written exactly as they were given, one per entry. With `--null`
//! each entry ends in NUL instead of a newline, for `xargs -0`.

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::Path;

use crate::report::Report;

/// Text formatter for a [`Report`].
#[derive(Debug, Clone, Copy)]
pub struct TextOutput<'a> {
    report: &'a Report,
    terminator: u8,
}

impl<'a> TextOutput<'a> {
    /// Newline-terminated output for `report`.
    #[must_use]
    pub fn new(report: &'a Report) -> Self {
        Self {
            report,
            terminator: b'\n',
        }
    }

    /// Terminate entries with NUL instead of newline.
    #[must_use]
    pub fn with_null(mut self, null: bool) -> Self {
        self.terminator = if null { b'\0' } else { b'\n' };
        self
    }

    /// Write every entry to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self.report {
            Report::Paths(paths) => {
                for path in paths {
                    writer.write_all(&path_bytes(path))?;
                    writer.write_all(&[self.terminator])?;
                }
            }
            Report::Counts(counts) => {
                for (path, count) in counts {
                    write!(writer, "{count}\t")?;
                    writer.write_all(&path_bytes(Path::new(path)))?;
                    writer.write_all(&[self.terminator])?;
                }
            }
        }
        Ok(())
    }

    /// Render to a string (lossy for non-UTF-8 paths).
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    match path.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::ffi::OsString;
    use std::path::PathBuf;

    #[test]
    fn test_paths_one_per_line() {
        let report = Report::Paths(vec![PathBuf::from("/a"), PathBuf::from("/b c")]);
        assert_eq!(TextOutput::new(&report).to_string_lossy(), "/a\n/b c\n");
    }

    #[test]
    fn test_paths_null_terminated() {
        let report = Report::Paths(vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        let text = TextOutput::new(&report).with_null(true).to_string_lossy();
        assert_eq!(text, "/a\0/b\0");
    }

    #[test]
    fn test_counts_tab_separated() {
        let mut counts = BTreeMap::new();
        counts.insert(OsString::from("/x"), 2);
        counts.insert(OsString::from("/y"), 1);
        let report = Report::Counts(counts);

        assert_eq!(TextOutput::new(&report).to_string_lossy(), "2\t/x\n1\t/y\n");
    }

    #[test]
    fn test_empty_report_writes_nothing() {
        let report = Report::Paths(Vec::new());
        assert!(TextOutput::new(&report).to_string_lossy().is_empty());
    }
}
