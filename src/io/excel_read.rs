//! Reading the source workbook: extension and size checks, locating the
//! required worksheet, and erasing calamine's cell types into the plain
//! [`CellValue`] matrix the pipeline consumes.

use std::io::Cursor;
use std::path::Path;

use calamine::{DataType, Reader, Xls, Xlsx};
use tracing::info;

use crate::error::{ConvertError, Result};
use crate::model::CellValue;

/// Substring the required worksheet name must contain.
pub const SHEET_NAME_HINT: &str = "表1";

/// Upper bound on the accepted workbook size.
pub const MAX_WORKBOOK_BYTES: u64 = 20 * 1024 * 1024;

const VALID_EXTENSIONS: [&str; 2] = ["xls", "xlsx"];

/// Magic prefix of the OLE2 compound file that legacy `.xls` workbooks
/// live in; anything else is handed to the xlsx (zip) reader.
const XLS_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];

/// Reads the cost sheet from a workbook on disk, enforcing the extension and
/// size limits before parsing.
pub fn read_cost_sheet(path: &Path) -> Result<Vec<Vec<CellValue>>> {
    check_extension(path)?;
    let bytes = std::fs::read(path)?;
    read_cost_sheet_bytes(&bytes)
}

/// Reads the cost sheet from an in-memory workbook: the first worksheet
/// whose name contains [`SHEET_NAME_HINT`], as a 2-D cell matrix.
///
/// Legacy `.xls` workbooks are recognized by their container magic and
/// parsed with the BIFF reader; everything else goes to the xlsx reader.
pub fn read_cost_sheet_bytes(bytes: &[u8]) -> Result<Vec<Vec<CellValue>>> {
    if bytes.len() as u64 > MAX_WORKBOOK_BYTES {
        return Err(ConvertError::FileTooLarge {
            size: bytes.len() as u64,
            limit: MAX_WORKBOOK_BYTES,
        });
    }

    if bytes.starts_with(&XLS_MAGIC) {
        let workbook: Xls<_> = Xls::new(Cursor::new(bytes))?;
        extract_matrix(workbook)
    } else {
        let workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
        extract_matrix(workbook)
    }
}

fn extract_matrix<RS, R>(mut workbook: R) -> Result<Vec<Vec<CellValue>>>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
    ConvertError: From<R::Error>,
{
    let sheet_name = workbook
        .sheet_names()
        .iter()
        .find(|name| name.contains(SHEET_NAME_HINT))
        .cloned()
        .ok_or_else(|| ConvertError::MissingWorksheet(SHEET_NAME_HINT.to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .ok_or_else(|| ConvertError::MissingWorksheet(sheet_name.clone()))?
        .map_err(ConvertError::from)?;

    info!(sheet = %sheet_name, rows = range.height(), "read source worksheet");

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_value).collect())
        .collect())
}

fn check_extension(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if VALID_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(ConvertError::InvalidExtension(extension))
    }
}

fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Text(value.to_string()),
        DataType::Empty => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}
