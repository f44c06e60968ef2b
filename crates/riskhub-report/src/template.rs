//! Named report templates and the tabular data they render

use crate::error::ReportError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// One column of a report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportColumn {
    pub header: &'static str,
    /// Excel column width in characters; PDF widths are proportional to it
    pub width: f64,
}

const fn col(header: &'static str, width: f64) -> ReportColumn {
    ReportColumn { header, width }
}

/// Static description of a report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportTemplate {
    /// Route and filename stem
    pub name: &'static str,
    /// Heading printed on the document
    pub title: &'static str,
    /// Worksheet name (at most 31 characters)
    pub sheet: &'static str,
    pub columns: &'static [ReportColumn],
}

/// Risk register: one line per risk
pub const RISK_REGISTER: ReportTemplate = ReportTemplate {
    name: "risk-register",
    title: "Register Risiko",
    sheet: "Register Risiko",
    columns: &[
        col("Kode", 14.0),
        col("Sasaran", 36.0),
        col("Pemilik Risiko", 20.0),
        col("Unit Kerja", 20.0),
        col("Kategori", 16.0),
        col("Nilai Inheren", 10.0),
        col("Level Inheren", 14.0),
        col("Nilai Residual", 10.0),
        col("Level Residual", 14.0),
        col("Status", 14.0),
        col("Review Berikutnya", 14.0),
    ],
};

/// SWOT factors with derived score
pub const SWOT: ReportTemplate = ReportTemplate {
    name: "swot",
    title: "Analisis SWOT",
    sheet: "SWOT",
    columns: &[
        col("Tahun", 8.0),
        col("Unit Kerja", 20.0),
        col("Kategori", 14.0),
        col("Objek Analisis", 40.0),
        col("Bobot", 8.0),
        col("Rank", 8.0),
        col("Score", 8.0),
    ],
};

/// Key risk indicators with status
pub const KRI: ReportTemplate = ReportTemplate {
    name: "kri",
    title: "Key Risk Indicator",
    sheet: "KRI",
    columns: &[
        col("Kode", 12.0),
        col("Indikator", 36.0),
        col("Satuan", 10.0),
        col("Batas Aman", 12.0),
        col("Batas Hati-hati", 12.0),
        col("Nilai Aktual", 12.0),
        col("Status", 14.0),
    ],
};

/// Mitigation monitoring
pub const MONITORING: ReportTemplate = ReportTemplate {
    name: "monitoring",
    title: "Monitoring Risiko",
    sheet: "Monitoring",
    columns: &[
        col("Kode Risiko", 14.0),
        col("Pemilik", 20.0),
        col("Rencana Mitigasi", 40.0),
        col("Tanggal Review", 14.0),
        col("Review Berikutnya", 14.0),
        col("Status", 14.0),
        col("Terlambat", 10.0),
    ],
};

/// Every template, by route name
pub const TEMPLATES: [&ReportTemplate; 4] = [&RISK_REGISTER, &SWOT, &KRI, &MONITORING];

impl ReportTemplate {
    /// Look up a template by route name
    ///
    /// # Errors
    /// [`ReportError::UnknownReport`] for an unknown name.
    pub fn by_name(name: &str) -> Result<&'static ReportTemplate, ReportError> {
        TEMPLATES
            .iter()
            .copied()
            .find(|t| t.name == name)
            .ok_or_else(|| ReportError::UnknownReport(name.to_string()))
    }
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    Excel,
    Pdf,
}

impl ReportFormat {
    /// MIME type of the rendered bytes
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pdf => "application/pdf",
        }
    }

    /// File extension without the dot
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Excel => "xlsx",
            Self::Pdf => "pdf",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "excel" | "xlsx" => Ok(Self::Excel),
            "pdf" => Ok(Self::Pdf),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Excel => "excel",
            Self::Pdf => "pdf",
        })
    }
}

/// One cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    /// Text for PDF output and plain display
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{n:.0}"),
            Self::Number(n) => format!("{n:.2}"),
            Self::Empty => String::new(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<u32> for Cell {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

/// A template filled with rows, ready to render
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub template: &'static ReportTemplate,
    /// Organization name printed in the PDF heading
    pub organization: String,
    pub generated_on: NaiveDate,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    /// Create an empty table
    #[must_use]
    pub fn new(
        template: &'static ReportTemplate,
        organization: impl Into<String>,
        generated_on: NaiveDate,
    ) -> Self {
        Self {
            template,
            organization: organization.into(),
            generated_on,
            rows: Vec::new(),
        }
    }

    /// Replace the rows
    #[must_use]
    pub fn with_rows(mut self, rows: Vec<Vec<Cell>>) -> Self {
        self.rows = rows;
        self
    }

    /// Check every row has one cell per column
    ///
    /// # Errors
    /// [`ReportError::RowWidth`] for the first mismatching row.
    pub fn check_shape(&self) -> Result<(), ReportError> {
        let expected = self.template.columns.len();
        for (row, cells) in self.rows.iter().enumerate() {
            if cells.len() != expected {
                return Err(ReportError::RowWidth {
                    template: self.template.name,
                    row,
                    expected,
                    actual: cells.len(),
                });
            }
        }
        Ok(())
    }

    /// Download filename, e.g. `swot-2025-03-01.xlsx`
    #[must_use]
    pub fn filename(&self, format: ReportFormat) -> String {
        format!(
            "{}-{}.{}",
            self.template.name,
            self.generated_on.format("%Y-%m-%d"),
            format.extension()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_lookup() {
        assert_eq!(ReportTemplate::by_name("kri").unwrap().title, "Key Risk Indicator");
        assert!(ReportTemplate::by_name("neraca").unwrap_err().is_not_found());
    }

    #[test]
    fn sheet_names_fit_excel_limit() {
        for t in TEMPLATES {
            assert!(t.sheet.len() <= 31, "{}", t.name);
        }
    }

    #[test]
    fn format_parsing() {
        assert_eq!("excel".parse::<ReportFormat>().unwrap(), ReportFormat::Excel);
        assert_eq!("pdf".parse::<ReportFormat>().unwrap(), ReportFormat::Pdf);
        assert!("docx".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn cell_display() {
        assert_eq!(Cell::from(20.0).display(), "20");
        assert_eq!(Cell::from(1.5).display(), "1.50");
        assert_eq!(Cell::from(None::<String>).display(), "");
    }

    #[test]
    fn shape_and_filename() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let table = ReportTable::new(&SWOT, "RSUD", date).with_rows(vec![vec![Cell::Empty]]);
        assert!(matches!(table.check_shape(), Err(ReportError::RowWidth { row: 0, .. })));
        assert_eq!(table.filename(ReportFormat::Excel), "swot-2025-03-01.xlsx");
    }
}
