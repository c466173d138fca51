//! CSV report output.
//!
//! # Output Format
//!
//! ```csv
//! path
//! /home/user/a.txt
//! ```
//!
//! or, in count mode:
//!
//! ```csv
//! path,count
//! /home/user/a.txt,2
//! ```

use std::io::Write;

use crate::report::Report;

/// CSV formatter for a [`Report`].
#[derive(Debug, Clone, Copy)]
pub struct CsvOutput<'a> {
    report: &'a Report,
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV formatter.
    #[must_use]
    pub fn new(report: &'a Report) -> Self {
        Self { report }
    }

    /// Write the header and one record per entry.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or CSV formatting fails.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);

        match self.report {
            Report::Paths(paths) => {
                wtr.write_record(["path"])?;
                for path in paths {
                    wtr.write_record([&*path.to_string_lossy()])?;
                }
            }
            Report::Counts(counts) => {
                wtr.write_record(["path", "count"])?;
                for (path, count) in counts {
                    let path = path.to_string_lossy();
                    let count = count.to_string();
                    wtr.write_record([&*path, count.as_str()])?;
                }
            }
        }

        wtr.flush()?;
        Ok(())
    }

    /// Render to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if CSV formatting fails.
    pub fn to_string(&self) -> Result<String, csv::Error> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
