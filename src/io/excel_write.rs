//! Writing the converted rows: a single styled worksheet, either to disk or
//! to an in-memory byte artifact. The header style and column widths are
//! opaque presentation hints carried through unchanged.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};

use crate::error::Result;
use crate::model::{OUTPUT_COLUMN_WIDTHS, OUTPUT_HEADERS, OUTPUT_SHEET_NAME, OutputRow};

const HEADER_FILL: Color = Color::RGB(0x2C3E50);

/// Writes the output rows to the given path.
pub fn write_rows(path: &Path, rows: &[OutputRow]) -> Result<()> {
    let mut workbook = build_workbook(rows)?;
    workbook.save(path)?;
    Ok(())
}

/// Renders the output rows into an in-memory xlsx artifact.
pub fn write_rows_to_buffer(rows: &[OutputRow]) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(rows)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(rows: &[OutputRow]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(OUTPUT_SHEET_NAME)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(HEADER_FILL)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    for (col_idx, header) in OUTPUT_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, *header, &header_format)?;
    }
    for (col_idx, width) in OUTPUT_COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col_idx as u16, *width)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.cells().iter().enumerate() {
            worksheet.write_string((row_idx + 1) as u32, col_idx as u16, *cell)?;
        }
    }

    Ok(workbook)
}
