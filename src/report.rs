//! Report assembly.
//!
//! Turns an [`Alignment`] into the four report sections: summary counts, the
//! detailed per-column comparison, and the keys found in only one file.
//!
//! "Missing in File 1" lists the keys that only file 2 has, and "Missing in
//! File 2" the keys that only file 1 has.

use serde::Serialize;

use crate::{
    align::{Alignment, JoinSide},
    data::{Cell, Value},
    diff::{RowComparison, diff},
};

pub const SUMMARY_SHEET: &str = "Summary";
pub const DETAIL_SHEET: &str = "Detailed Comparison";
pub const MISSING_IN_FILE1_SHEET: &str = "Missing in File 1";
pub const MISSING_IN_FILE2_SHEET: &str = "Missing in File 2";

const DETAIL_KEY_HEADER: &str = "KeyColumn";
const MISSING_KEY_HEADER: &str = "keycolumn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub matched_records: usize,
    pub not_matched_records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub summary: Summary,
    /// Case-folded compared column names, in configured order.
    pub columns: Vec<String>,
    pub detail: Vec<RowComparison>,
    /// Keys present only in file 2.
    pub missing_in_file1: Vec<Cell>,
    /// Keys present only in file 1.
    pub missing_in_file2: Vec<Cell>,
}

/// One named grid of the report, ready for display or serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: &'static str,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Section {
    /// Rows rendered with each cell's canonical display string.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(Cell::as_display).collect())
            .collect()
    }
}

pub fn assemble(alignment: &Alignment) -> ComparisonReport {
    let detail = diff(alignment);
    let keys_for = |side: JoinSide| {
        alignment
            .rows()
            .iter()
            .filter(|row| row.pairing.side() == side)
            .map(|row| row.key.clone())
            .collect::<Vec<_>>()
    };
    let missing_in_file1 = keys_for(JoinSide::RightOnly);
    let missing_in_file2 = keys_for(JoinSide::LeftOnly);

    ComparisonReport {
        summary: Summary {
            matched_records: detail.len(),
            not_matched_records: missing_in_file1.len() + missing_in_file2.len(),
        },
        columns: alignment.columns().iter().map(|c| c.name.clone()).collect(),
        detail,
        missing_in_file1,
        missing_in_file2,
    }
}

impl ComparisonReport {
    pub fn mismatched_rows(&self) -> usize {
        self.detail
            .iter()
            .filter(|row| row.mismatch_count() > 0)
            .count()
    }

    pub fn summary_section(&self) -> Section {
        Section {
            name: SUMMARY_SHEET,
            headers: vec!["Description".to_string(), "Count".to_string()],
            rows: vec![
                vec![
                    Cell::text("Matched Records"),
                    count_cell(self.summary.matched_records),
                ],
                vec![
                    Cell::text("Not Matched Records"),
                    count_cell(self.summary.not_matched_records),
                ],
            ],
        }
    }

    pub fn detail_section(&self) -> Section {
        let mut headers = Vec::with_capacity(self.columns.len() + 1);
        headers.push(DETAIL_KEY_HEADER.to_string());
        headers.extend(self.columns.iter().cloned());
        let rows = self
            .detail
            .iter()
            .map(|row| {
                std::iter::once(row.key.clone())
                    .chain(row.verdicts.iter().map(|v| Cell::text(v.to_string())))
                    .collect()
            })
            .collect();
        Section {
            name: DETAIL_SHEET,
            headers,
            rows,
        }
    }

    pub fn missing_in_file1_section(&self) -> Section {
        missing_section(MISSING_IN_FILE1_SHEET, &self.missing_in_file1)
    }

    pub fn missing_in_file2_section(&self) -> Section {
        missing_section(MISSING_IN_FILE2_SHEET, &self.missing_in_file2)
    }

    /// All four sections in report order.
    pub fn sections(&self) -> [Section; 4] {
        [
            self.summary_section(),
            self.detail_section(),
            self.missing_in_file1_section(),
            self.missing_in_file2_section(),
        ]
    }
}

fn count_cell(count: usize) -> Cell {
    Cell::Value(Value::Integer(i64::try_from(count).unwrap_or(i64::MAX)))
}

fn missing_section(name: &'static str, keys: &[Cell]) -> Section {
    Section {
        name,
        headers: vec![MISSING_KEY_HEADER.to_string()],
        rows: keys.iter().map(|key| vec![key.clone()]).collect(),
    }
}
