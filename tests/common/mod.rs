#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;
use sheet_compare::data::{Cell, Value};
use sheet_compare::dataset::Table;
use sheet_compare::error::SourceSide;
use tempfile::{tempdir, TempDir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a single-sheet workbook; cells that parse as numbers are stored
    /// as numbers, everything else as text, blanks are left empty.
    pub fn write_xlsx(&self, name: &str, sheet: &str, rows: &[&[&str]]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut workbook = Workbook::new();
        let worksheet = workbook
            .add_worksheet()
            .set_name(sheet)
            .expect("sheet name");
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                if value.is_empty() {
                    continue;
                }
                match value.parse::<f64>() {
                    Ok(number) if r > 0 => {
                        worksheet.write_number(r, c, number).expect("write number");
                    }
                    _ => {
                        worksheet.write_string(r, c, *value).expect("write string");
                    }
                }
            }
        }
        workbook.save(&path).expect("save workbook");
        path
    }
}

pub fn int(value: i64) -> Cell {
    Cell::Value(Value::Integer(value))
}

pub fn text(value: &str) -> Cell {
    Cell::text(value)
}

pub fn table(side: SourceSide, headers: &[&str], rows: Vec<Vec<Cell>>) -> Table {
    Table::new(side, headers.iter().map(|h| h.to_string()).collect(), rows)
        .expect("valid table")
}
