//! Error types for report rendering

use std::path::PathBuf;

/// Report failure
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// No template with this name
    #[error("unknown report: {0}")]
    UnknownReport(String),

    /// No renderer for this format
    #[error("unknown report format: {0}")]
    UnknownFormat(String),

    /// Row width differs from the template's column count
    #[error("row {row} has {actual} cells, template {template} has {expected} columns")]
    RowWidth {
        /// Template name
        template: &'static str,
        /// Zero-based row index
        row: usize,
        /// Column count
        expected: usize,
        /// Cell count
        actual: usize,
    },

    /// Spreadsheet writer failed
    #[error("excel rendering failed: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),

    /// PDF writer failed
    #[error("pdf rendering failed: {0}")]
    Pdf(String),

    /// Rendered file could not be written
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    /// Check if the caller asked for something that does not exist
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownReport(_) | Self::UnknownFormat(_))
    }
}
