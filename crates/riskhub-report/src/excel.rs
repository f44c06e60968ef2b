//! Single-sheet xlsx rendering

use crate::error::ReportError;
use crate::template::{Cell, ReportTable};
use rust_xlsxwriter::{Format, FormatBorder, Workbook};

/// Render the table as an xlsx workbook held in memory
///
/// Bold bordered header row, frozen below the header, one row per record.
///
/// # Errors
/// Row shape mismatch or a writer failure.
pub fn render(table: &ReportTable) -> Result<Vec<u8>, ReportError> {
    table.check_shape()?;

    let mut workbook = Workbook::new();
    let header = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_background_color("#D9E1F2");
    let sheet = workbook.add_worksheet();
    sheet.set_name(table.template.sheet)?;

    for (c, column) in table.template.columns.iter().enumerate() {
        let c = to_col(c);
        sheet.write_string_with_format(0, c, column.header, &header)?;
        sheet.set_column_width(c, column.width)?;
    }

    for (r, cells) in table.rows.iter().enumerate() {
        let r = to_row(r + 1);
        for (c, cell) in cells.iter().enumerate() {
            let c = to_col(c);
            match cell {
                Cell::Text(s) => {
                    sheet.write_string(r, c, s)?;
                }
                Cell::Number(n) => {
                    sheet.write_number(r, c, *n)?;
                }
                Cell::Empty => {}
            }
        }
    }

    sheet.set_freeze_panes(1, 0)?;
    let bytes = workbook.save_to_buffer()?;
    tracing::debug!(report = table.template.name, rows = table.rows.len(), bytes = bytes.len(), "rendered xlsx");
    Ok(bytes)
}

fn to_row(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

fn to_col(index: usize) -> u16 {
    u16::try_from(index).unwrap_or(u16::MAX)
}
