use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use cbs_tools::convert;
use cbs_tools::error::ConvertError;
use cbs_tools::model::{OUTPUT_HEADERS, OUTPUT_SHEET_NAME, OutputRow};
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

/// One source row of the synthetic 表1 fixture, written at the fixed column
/// offsets the converter expects.
struct FixtureRow {
    sequence: &'static str,
    name: &'static str,
    category: &'static str,
    unit: &'static str,
    quantity: Option<f64>,
    contract_price: Option<f64>,
    professional: Option<f64>,
    labor: Option<f64>,
}

fn fixture_row(
    sequence: &'static str,
    name: &'static str,
    category: &'static str,
    unit: &'static str,
    quantity: Option<f64>,
    contract_price: Option<f64>,
    professional: Option<f64>,
    labor: Option<f64>,
) -> FixtureRow {
    FixtureRow {
        sequence,
        name,
        category,
        unit,
        quantity,
        contract_price,
        professional,
        labor,
    }
}

fn fixture_rows() -> Vec<FixtureRow> {
    vec![
        fixture_row("一", "示例项目", "", "", None, None, None, None),
        fixture_row("1", "工程1", "", "", None, None, None, None),
        fixture_row("1.1", "分部1.1", "", "", None, None, None, None),
        fixture_row(
            "1.1.1",
            "分项1.1.1",
            "",
            "m3",
            Some(10.0),
            Some(100.0),
            Some(80.0),
            None,
        ),
        fixture_row(
            "1.1.2",
            "分项1.1.2",
            "",
            "m3",
            Some(20.0),
            Some(200.0),
            None,
            Some(150.0),
        ),
        fixture_row(
            "1.2",
            "分部1.2",
            "",
            "m3",
            Some(30.0),
            Some(300.0),
            None,
            Some(250.0),
        ),
        fixture_row("2", "工程2", "", "", None, None, None, None),
        fixture_row(
            "2.1",
            "分部2.1",
            "",
            "个",
            Some(40.0),
            Some(400.0),
            Some(350.0),
            None,
        ),
        fixture_row("5", "材料机械", "0003", "", None, None, None, None),
        fixture_row("6", "其他费用", "", "", None, None, None, None),
        fixture_row(
            "6.1",
            "零星用工",
            "",
            "工日",
            Some(2.0),
            None,
            None,
            Some(50.0),
        ),
    ]
}

/// Writes the fixture as a realistic source workbook: a few preamble rows,
/// then the data block starting at column offset 2.
fn write_fixture_workbook(path: &Path) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("表1").expect("sheet name set");

    worksheet
        .write_string(0, 0, "某项目成本测算表")
        .expect("title written");
    worksheet
        .write_string(4, 2, "序号")
        .expect("header written");
    worksheet
        .write_string(4, 3, "项目名称")
        .expect("header written");

    for (offset, row) in fixture_rows().iter().enumerate() {
        let row_idx = (6 + offset) as u32;
        worksheet
            .write_string(row_idx, 2, row.sequence)
            .expect("sequence written");
        worksheet
            .write_string(row_idx, 3, row.name)
            .expect("name written");
        worksheet
            .write_string(row_idx, 4, row.category)
            .expect("category written");
        worksheet
            .write_string(row_idx, 5, row.unit)
            .expect("unit written");
        for (col, value) in [
            (6, row.quantity),
            (7, row.contract_price),
            (8, row.professional),
            (9, row.labor),
        ] {
            if let Some(value) = value {
                worksheet
                    .write_number(row_idx, col, value)
                    .expect("number written");
            }
        }
    }

    workbook.save(path).expect("fixture workbook saved");
}

fn find<'a>(rows: &'a [OutputRow], code: &str) -> &'a OutputRow {
    rows.iter()
        .find(|row| row.item_code == code)
        .unwrap_or_else(|| panic!("missing output row {code}"))
}

#[test]
fn converts_fixture_workbook_end_to_end() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("表1.xlsx");
    let output = temp_dir.path().join("转换结果.xlsx");
    write_fixture_workbook(&input);

    let report = convert::convert_file(&input, &output).expect("conversion succeeded");

    assert_eq!(report.project_name, "示例项目");
    assert!(report.warnings.is_empty());

    let codes: Vec<&str> = report
        .rows
        .iter()
        .map(|row| row.item_code.as_str())
        .collect();
    assert_eq!(
        codes,
        vec![
            "0",
            "1",
            "1.001",
            "1.001.001",
            "1.001.001.002",
            "1.001.002",
            "1.001.002.001",
            "1.002",
            "1.002.001",
            "2",
            "2.001",
            "2.001.002",
            "5",
            "6",
            "6.001",
        ]
    );

    let summary = find(&report.rows, "0");
    assert_eq!(summary.item_name, "示例项目");
    assert_eq!(summary.contract_amount, "30000");
    assert_eq!(summary.estimate_amount, "25400");

    let group1 = find(&report.rows, "1");
    assert_eq!(group1.contract_amount, "14000");
    assert_eq!(group1.estimate_amount, "11300");

    let leaf = find(&report.rows, "1.001.001");
    assert_eq!(leaf.contract_quantity, "10");
    assert_eq!(leaf.contract_unit_price, "100");
    assert_eq!(leaf.contract_amount, "1000");
    assert_eq!(leaf.unit, "");
    assert_eq!(leaf.estimate_amount, "");

    let detail = find(&report.rows, "1.001.001.002");
    assert_eq!(detail.item_name, "分项1.1.1：专业分包");
    assert_eq!(detail.cost_category, "0002");
    assert_eq!(detail.estimate_quantity, "10");
    assert_eq!(detail.estimate_unit_price, "80");
    assert_eq!(detail.estimate_amount, "800");
    assert_eq!(detail.unit, "m3");

    // Groups 5 and 6 are the two numerically-largest top-level groups: their
    // subcontract details are suppressed, the money stays in the roll-up.
    assert!(report.rows.iter().all(|row| row.item_code != "6.001.001"));
    let group6 = find(&report.rows, "6");
    assert_eq!(group6.estimate_amount, "100");
    let summarized = find(&report.rows, "6.001");
    assert_eq!(summarized.unit, "工日");
    assert_eq!(summarized.estimate_amount, "");
    assert_eq!(summarized.contract_amount, "");

    let materials = find(&report.rows, "5");
    assert_eq!(materials.cost_category, "0003");
    assert_eq!(materials.contract_amount, "");
}

#[test]
fn written_workbook_matches_report_rows() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("表1.xlsx");
    let output = temp_dir.path().join("转换结果.xlsx");
    write_fixture_workbook(&input);

    let report = convert::convert_file(&input, &output).expect("conversion succeeded");

    let mut workbook: Xlsx<_> = open_workbook(&output).expect("output workbook opened");
    let range = workbook
        .worksheet_range(OUTPUT_SHEET_NAME)
        .expect("output worksheet present")
        .expect("output worksheet read");

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .expect("header row present")
        .iter()
        .map(|cell| match cell {
            DataType::String(value) => value.clone(),
            other => other.to_string(),
        })
        .collect();
    let expected_headers: Vec<String> = OUTPUT_HEADERS.iter().map(|h| h.to_string()).collect();
    assert_eq!(headers, expected_headers);

    let body: Vec<Vec<String>> = rows
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    DataType::String(value) => value.clone(),
                    DataType::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect();
    assert_eq!(body.len(), report.rows.len());
    for (written, emitted) in body.iter().zip(&report.rows) {
        let expected: Vec<String> = emitted
            .cells()
            .iter()
            .map(|cell| cell.to_string())
            .collect();
        assert_eq!(written, &expected);
    }
}

#[test]
fn missing_source_worksheet_is_fatal() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("other.xlsx");
    let output = temp_dir.path().join("out.xlsx");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("别的表").expect("sheet name set");
    worksheet.write_string(0, 0, "x").expect("cell written");
    workbook.save(&input).expect("workbook saved");

    let error = convert::convert_file(&input, &output).expect_err("conversion rejected");
    assert!(matches!(error, ConvertError::MissingWorksheet(_)));
    assert!(!output.exists());
}

#[test]
fn legacy_xls_input_reaches_the_biff_reader() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("budget.xls");
    // OLE2 signature followed by garbage: the extension gate must pass and
    // the bytes must fail inside the BIFF reader, not as a zip error.
    let mut bytes = vec![0xD0, 0xCF, 0x11, 0xE0];
    bytes.extend_from_slice(b"not a complete compound file");
    std::fs::write(&input, &bytes).expect("file written");

    let error = convert::convert_file(&input, &temp_dir.path().join("out.xlsx"))
        .expect_err("conversion rejected");
    assert!(matches!(error, ConvertError::XlsRead(_)));
}

#[test]
fn unsupported_extension_is_fatal() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("budget.csv");
    std::fs::write(&input, "not a workbook").expect("file written");

    let error = convert::convert_file(&input, &temp_dir.path().join("out.xlsx"))
        .expect_err("conversion rejected");
    assert!(matches!(error, ConvertError::InvalidExtension(ext) if ext == "csv"));
}
