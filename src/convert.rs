//! Conversion orchestration: the single uninterrupted pass from raw cell
//! matrix to sorted output rows, with file- and buffer-level entry points
//! layered on top.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::aggregate;
use crate::emit;
use crate::error::{Result, RowWarning};
use crate::io::{excel_read, excel_write};
use crate::model::{CellValue, OutputRow};
use crate::numerals::ChineseNumerals;
use crate::policy;
use crate::rows;
use crate::tree;

/// Result of one conversion: the emitted rows plus the diagnostics gathered
/// along the way. Warnings never halt processing; callers decide whether to
/// surface them.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub project_name: String,
    pub rows: Vec<OutputRow>,
    pub warnings: Vec<RowWarning>,
}

/// Condensed view of one output row, for preview listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewRow {
    pub item_code: String,
    pub hierarchy_code: String,
    pub item_name: String,
    pub estimate_amount: String,
    pub contract_amount: String,
}

impl ConversionReport {
    /// Returns up to `limit` condensed rows for previewing the output.
    pub fn preview(&self, limit: usize) -> Vec<PreviewRow> {
        self.rows
            .iter()
            .take(limit)
            .map(|row| PreviewRow {
                item_code: row.item_code.clone(),
                hierarchy_code: row.hierarchy_code.clone(),
                item_name: row.item_name.clone(),
                estimate_amount: row.estimate_amount.clone(),
                contract_amount: row.contract_amount.clone(),
            })
            .collect()
    }
}

/// Runs the pipeline on an already-read cell matrix: normalize rows, build
/// the tree, mark the final two groups, roll up amounts, emit rows.
#[instrument(level = "info", skip_all)]
pub fn convert_matrix(matrix: &[Vec<CellValue>]) -> Result<ConversionReport> {
    let sheet = rows::extract_rows(matrix)?;
    info!(
        project = %sheet.project_name,
        row_count = sheet.rows.len(),
        "normalized source rows"
    );

    let mut warnings = Vec::new();
    let mut tree = tree::build(&sheet, &ChineseNumerals, &mut warnings);
    policy::mark_final_two_groups(&mut tree);
    let amounts = aggregate::aggregate(&tree);
    let rows = emit::emit(&tree, &amounts);

    debug!(
        node_count = tree.len(),
        output_rows = rows.len(),
        warning_count = warnings.len(),
        "conversion pipeline finished"
    );
    for warning in &warnings {
        warn!(%warning, "row dropped");
    }

    Ok(ConversionReport {
        project_name: sheet.project_name,
        rows,
        warnings,
    })
}

/// Converts an in-memory source workbook.
#[instrument(level = "info", skip_all, fields(size = bytes.len()))]
pub fn convert_bytes(bytes: &[u8]) -> Result<ConversionReport> {
    let matrix = excel_read::read_cost_sheet_bytes(bytes)?;
    convert_matrix(&matrix)
}

/// Converts a workbook on disk and writes the result workbook next to it.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn convert_file(input: &Path, output: &Path) -> Result<ConversionReport> {
    let matrix = excel_read::read_cost_sheet(input)?;
    let report = convert_matrix(&matrix)?;
    excel_write::write_rows(output, &report.rows)?;
    info!(
        output_rows = report.rows.len(),
        warning_count = report.warnings.len(),
        "conversion written"
    );
    Ok(report)
}
