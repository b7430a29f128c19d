//! Row normalization: locating the start of valid data inside the raw cell
//! matrix, extracting typed [`CostRow`] records, and discovering the project
//! title row.

use tracing::{debug, info};

use crate::error::{ConvertError, Result};
use crate::model::{CellValue, CostRow};

/// Minimum number of raw rows a plausible cost-breakdown sheet carries.
pub const MIN_SHEET_ROWS: usize = 10;

/// Minimum cell count below which a raw row is treated as decoration.
const MIN_ROW_CELLS: usize = 5;

/// Fallback project title when no title row is discovered.
pub const DEFAULT_PROJECT_NAME: &str = "项目一";

/// Column offsets of the source sheet (0-based).
pub mod column {
    pub const SEQUENCE: usize = 2;
    pub const ITEM_NAME: usize = 3;
    pub const COST_CATEGORY: usize = 4;
    pub const UNIT: usize = 5;
    pub const QUANTITY: usize = 6;
    pub const CONTRACT_UNIT_PRICE: usize = 7;
    pub const PROFESSIONAL_SUB_PRICE: usize = 8;
    pub const LABOR_SUB_PRICE: usize = 9;
}

/// Ordered cost rows extracted from one worksheet, plus the discovered
/// project title.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRows {
    pub project_name: String,
    pub rows: Vec<CostRow>,
}

/// Scans the raw matrix for the start marker (a sequence label of `一` or
/// `1`), then extracts every subsequent row with a non-blank sequence label.
/// A `一` row carrying an item name supplies the project title.
pub fn extract_rows(matrix: &[Vec<CellValue>]) -> Result<SheetRows> {
    if matrix.len() < MIN_SHEET_ROWS {
        return Err(ConvertError::InsufficientRows {
            found: matrix.len(),
            required: MIN_SHEET_ROWS,
        });
    }

    let mut project_name = DEFAULT_PROJECT_NAME.to_string();
    let mut rows = Vec::new();
    let mut found_first_row = false;

    for raw in matrix {
        if raw.len() < MIN_ROW_CELLS {
            continue;
        }

        let sequence_label = cell_text(raw, column::SEQUENCE);
        if sequence_label == "一" || sequence_label == "1" {
            found_first_row = true;
        }
        if !found_first_row {
            continue;
        }

        let row = CostRow {
            sequence_label: sequence_label.clone(),
            item_name: cell_text(raw, column::ITEM_NAME),
            cost_category: cell_text(raw, column::COST_CATEGORY),
            unit: cell_text(raw, column::UNIT),
            quantity: cell_number(raw, column::QUANTITY),
            contract_unit_price: cell_number(raw, column::CONTRACT_UNIT_PRICE),
            professional_sub_price: cell_number(raw, column::PROFESSIONAL_SUB_PRICE),
            labor_sub_price: cell_number(raw, column::LABOR_SUB_PRICE),
        };

        if sequence_label == "一" && !row.item_name.is_empty() {
            project_name = row.item_name.clone();
            debug!(project = %project_name, "discovered project title row");
        }

        if sequence_label.is_empty() || sequence_label == "nan" {
            continue;
        }

        rows.push(row);
    }

    if rows.is_empty() {
        return Err(ConvertError::NoValidRows);
    }

    info!(row_count = rows.len(), "extracted cost rows");
    Ok(SheetRows { project_name, rows })
}

fn cell_text(row: &[CellValue], index: usize) -> String {
    row.get(index)
        .map(|cell| cell.as_text().trim().to_string())
        .unwrap_or_default()
}

fn cell_number(row: &[CellValue], index: usize) -> Option<f64> {
    parse_number(row.get(index)?)
}

/// Lenient numeric parsing: blanks and `NaN` markers become `None`, textual
/// cells are stripped down to digits, dot, and minus before parsing. A
/// missing number stays `None`, it is never coerced to zero here.
pub fn parse_number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Empty => None,
        CellValue::Number(value) => {
            if value.is_nan() {
                None
            } else {
                Some(*value)
            }
        }
        CellValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed == "NaN" {
                return None;
            }
            let cleaned: String = trimmed
                .chars()
                .filter(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == '-')
                .collect();
            if cleaned.is_empty() || cleaned == "-" || cleaned == "." {
                return None;
            }
            cleaned.parse::<f64>().ok()
        }
    }
}
