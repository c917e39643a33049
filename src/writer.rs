//! Spreadsheet serialization of a [`ComparisonReport`].

use std::{fs, path::Path};

use log::info;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::{
    data::{Cell, Value},
    error::{CompareError, Result},
    report::{ComparisonReport, Section},
};

/// Builds the report workbook and returns its bytes.
pub fn render_workbook(report: &ComparisonReport) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    for section in report.sections() {
        let worksheet = workbook.add_worksheet().set_name(section.name)?;
        write_section(worksheet, &section, &header_format)?;
    }
    Ok(workbook.save_to_buffer()?)
}

/// Renders the workbook, saves it to `path` and returns the bytes written.
pub fn write_report(report: &ComparisonReport, path: &Path) -> Result<Vec<u8>> {
    let bytes = render_workbook(report)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| CompareError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, &bytes).map_err(|source| CompareError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Comparison report ({} bytes) written to {:?}", bytes.len(), path);
    Ok(bytes)
}

fn write_section(worksheet: &mut Worksheet, section: &Section, header_format: &Format) -> Result<()> {
    for (col, header) in section.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, column_number(col), header, header_format)?;
    }
    for (row_idx, row) in section.rows.iter().enumerate() {
        let row_number = u32::try_from(row_idx + 1).unwrap_or(u32::MAX);
        for (col, cell) in row.iter().enumerate() {
            write_cell(worksheet, row_number, column_number(col), cell)?;
        }
    }
    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<()> {
    let Cell::Value(value) = cell else {
        return Ok(());
    };
    match value {
        Value::Integer(i) => {
            worksheet.write_number(row, col, *i as f64)?;
        }
        Value::Float(f) => {
            worksheet.write_number(row, col, *f)?;
        }
        Value::Boolean(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::String(_) | Value::Date(_) | Value::DateTime(_) => {
            worksheet.write_string(row, col, value.as_display())?;
        }
    }
    Ok(())
}

fn column_number(idx: usize) -> u16 {
    u16::try_from(idx).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{Data, Reader, Xlsx};

    use super::*;
    use crate::{diff::Verdict, diff::RowComparison, report::Summary};

    fn sample_report() -> ComparisonReport {
        ComparisonReport {
            summary: Summary {
                matched_records: 1,
                not_matched_records: 1,
            },
            columns: vec!["amt".into()],
            detail: vec![RowComparison {
                key: Cell::Value(Value::Integer(1)),
                verdicts: vec![Verdict::Mismatch {
                    left: "10".into(),
                    right: "12".into(),
                }],
            }],
            missing_in_file1: Vec::new(),
            missing_in_file2: vec![Cell::Value(Value::Integer(2))],
        }
    }

    #[test]
    fn workbook_contains_the_four_named_sheets() {
        let bytes = render_workbook(&sample_report()).expect("render");
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).expect("open xlsx");

        assert_eq!(
            workbook.sheet_names(),
            vec![
                "Summary",
                "Detailed Comparison",
                "Missing in File 1",
                "Missing in File 2"
            ]
        );

        let detail = workbook
            .worksheet_range("Detailed Comparison")
            .expect("detail sheet");
        assert_eq!(detail.get_value((0, 0)), Some(&Data::String("KeyColumn".into())));
        assert_eq!(detail.get_value((1, 0)), Some(&Data::Float(1.0)));
        assert_eq!(detail.get_value((1, 1)), Some(&Data::String("10 | 12".into())));

        let missing = workbook
            .worksheet_range("Missing in File 2")
            .expect("missing sheet");
        assert_eq!(missing.get_value((0, 0)), Some(&Data::String("keycolumn".into())));
        assert_eq!(missing.get_value((1, 0)), Some(&Data::Float(2.0)));
    }

    #[test]
    fn write_report_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("report.xlsx");

        let bytes = write_report(&sample_report(), &path).expect("write");

        assert_eq!(fs::read(&path).expect("read back"), bytes);
    }
}
