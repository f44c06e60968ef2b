//! RiskHub Report - Excel and PDF exports
//!
//! A report is a named [`ReportTemplate`] filled with rows into a
//! [`ReportTable`], then rendered whole into memory:
//! - [`excel::render`]: one worksheet, bold frozen header row
//! - [`pdf::render`]: landscape A4, heading, paginated lines
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use riskhub_report::{render, Cell, ReportFormat, ReportTable, template::KRI};
//!
//! let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
//! let table = ReportTable::new(&KRI, "RSUD Sehat", date).with_rows(vec![vec![
//!     Cell::from("KRI-01"),
//!     Cell::from("Angka infeksi"),
//!     Cell::from("%"),
//!     Cell::from(1.0),
//!     Cell::from(2.0),
//!     Cell::Empty,
//!     Cell::from("Belum Diukur"),
//! ]]);
//! let report = render(&table, ReportFormat::Excel).unwrap();
//! assert!(report.bytes.starts_with(b"PK\x03\x04"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod excel;
pub mod pdf;
pub mod rows;
pub mod template;

pub use error::ReportError;
pub use template::{Cell, ReportColumn, ReportFormat, ReportTable, ReportTemplate};

use std::path::{Path, PathBuf};

/// Rendered document with its download metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

impl RenderedReport {
    /// Write the document into `dir` under its download filename
    ///
    /// # Errors
    /// [`ReportError::Io`] if the file cannot be written.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Render a table in the requested format
///
/// # Errors
/// See [`excel::render`] and [`pdf::render`].
pub fn render(table: &ReportTable, format: ReportFormat) -> Result<RenderedReport, ReportError> {
    let bytes = match format {
        ReportFormat::Excel => excel::render(table)?,
        ReportFormat::Pdf => pdf::render(table)?,
    };
    Ok(RenderedReport {
        bytes,
        content_type: format.content_type(),
        filename: table.filename(format),
    })
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
