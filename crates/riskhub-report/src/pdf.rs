//! Paginated PDF rendering with the built-in Helvetica faces

use crate::error::ReportError;
use crate::template::ReportTable;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 12.0;
const LINE_HEIGHT: f32 = 5.5;
const TITLE_SIZE: f32 = 14.0;
const META_SIZE: f32 = 9.0;
const BODY_SIZE: f32 = 7.5;
/// Approximate Helvetica advance at 1pt, in mm
const CHAR_WIDTH_PER_PT: f32 = 0.19;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

struct Layout {
    /// Left edge of every column
    x: Vec<f32>,
    /// Characters that fit in every column
    chars: Vec<usize>,
}

impl Layout {
    fn for_table(table: &ReportTable) -> Self {
        let usable = PAGE_WIDTH - 2.0 * MARGIN;
        let total: f64 = table.template.columns.iter().map(|c| c.width).sum();
        let mut x = Vec::with_capacity(table.template.columns.len());
        let mut chars = Vec::with_capacity(table.template.columns.len());
        let mut left = MARGIN;
        for column in table.template.columns {
            let width = (column.width / total) as f32 * usable;
            x.push(left);
            let fit = (width - 1.5) / (BODY_SIZE * CHAR_WIDTH_PER_PT);
            chars.push(fit.max(1.0) as usize);
            left += width;
        }
        Self { x, chars }
    }
}

/// Render the table as a landscape A4 PDF held in memory
///
/// Each page repeats the header row; a new page starts when the next line
/// would cross the bottom margin.
///
/// # Errors
/// Row shape mismatch or a writer failure.
pub fn render(table: &ReportTable) -> Result<Vec<u8>, ReportError> {
    table.check_shape()?;

    let (doc, page, layer) = PdfDocument::new(
        table.template.title,
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "content",
    );
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(format!("{e:?}")))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(format!("{e:?}")))?,
    };
    let layout = Layout::for_table(table);

    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = heading(&current, table, &fonts);
    y = header_row(&current, table, &layout, &fonts, y);
    let mut pages = 1usize;

    for cells in &table.rows {
        if y < MARGIN + LINE_HEIGHT {
            current = new_page(&doc);
            pages += 1;
            y = header_row(&current, table, &layout, &fonts, PAGE_HEIGHT - MARGIN);
        }
        for (i, cell) in cells.iter().enumerate() {
            let text = fit(&ascii(&cell.display()), layout.chars[i]);
            current.use_text(text, BODY_SIZE, Mm(layout.x[i]), Mm(y), &fonts.regular);
        }
        y -= LINE_HEIGHT;
    }

    if table.rows.is_empty() {
        current.use_text("Tidak ada data.", BODY_SIZE, Mm(MARGIN), Mm(y), &fonts.regular);
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| ReportError::Pdf(format!("{e:?}")))?;
    tracing::debug!(report = table.template.name, rows = table.rows.len(), pages, bytes = bytes.len(), "rendered pdf");
    Ok(bytes)
}

fn new_page(doc: &PdfDocumentReference) -> PdfLayerReference {
    let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
    doc.get_page(page).get_layer(layer)
}

/// Title, organization and date; returns the next baseline
fn heading(layer: &PdfLayerReference, table: &ReportTable, fonts: &Fonts) -> f32 {
    let mut y = PAGE_HEIGHT - MARGIN;
    layer.use_text(ascii(table.template.title), TITLE_SIZE, Mm(MARGIN), Mm(y), &fonts.bold);
    y -= LINE_HEIGHT * 1.5;
    let meta = format!(
        "{} - dibuat {}",
        ascii(&table.organization),
        table.generated_on.format("%d-%m-%Y")
    );
    layer.use_text(meta, META_SIZE, Mm(MARGIN), Mm(y), &fonts.regular);
    y - LINE_HEIGHT * 1.5
}

fn header_row(
    layer: &PdfLayerReference,
    table: &ReportTable,
    layout: &Layout,
    fonts: &Fonts,
    y: f32,
) -> f32 {
    for (i, column) in table.template.columns.iter().enumerate() {
        let text = fit(column.header, layout.chars[i]);
        layer.use_text(text, BODY_SIZE, Mm(layout.x[i]), Mm(y), &fonts.bold);
    }
    y - LINE_HEIGHT
}

/// The built-in faces only cover ASCII reliably
fn ascii(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201c}' | '\u{201d}' => '"',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            c if c.is_whitespace() => ' ',
            _ => '?',
        })
        .collect()
}

/// Truncate to `max` characters, marking the cut with `..`
fn fit(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(2);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("..");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_replaces_unsupported_characters() {
        assert_eq!(ascii("Sasaran – mutu “tinggi”"), "Sasaran - mutu \"tinggi\"");
        assert_eq!(ascii("Ruang\tICU"), "Ruang ICU");
        assert_eq!(ascii("Café"), "Caf?");
    }

    #[test]
    fn fit_truncates_with_marker() {
        assert_eq!(fit("Instalasi Gawat Darurat", 10), "Instalas..");
        assert_eq!(fit("IGD", 10), "IGD");
    }
}
