//! Column-wise verdicts for matched rows.
//!
//! Values are compared by their canonical string form, trimmed, with exact
//! (case-sensitive) equality. Only column names are case-folded.

use std::fmt;

use serde::Serialize;

use crate::{
    align::{Alignment, ColumnPair, Pairing},
    data::Cell,
};

pub const MATCHED_LABEL: &str = "Matched";
pub const NOT_AVAILABLE_LABEL: &str = "Not Available";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Matched,
    Mismatch { left: String, right: String },
    NotAvailable,
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        matches!(self, Verdict::Matched)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Matched => write!(f, "{MATCHED_LABEL}"),
            Verdict::Mismatch { left, right } => write!(f, "{left} | {right}"),
            Verdict::NotAvailable => write!(f, "{NOT_AVAILABLE_LABEL}"),
        }
    }
}

/// Verdicts for one matched row, in compared-column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowComparison {
    pub key: Cell,
    pub verdicts: Vec<Verdict>,
}

impl RowComparison {
    pub fn mismatch_count(&self) -> usize {
        self.verdicts.iter().filter(|v| !v.is_match()).count()
    }
}

pub fn compare_cells(left: &Cell, right: &Cell) -> Verdict {
    let left = left.as_display();
    let right = right.as_display();
    let (left, right) = (left.trim(), right.trim());
    if left == right {
        Verdict::Matched
    } else {
        Verdict::Mismatch {
            left: left.to_string(),
            right: right.to_string(),
        }
    }
}

/// Compares one left row against one right row over the aligned columns.
pub fn compare_row(columns: &[ColumnPair], left: &[Cell], right: &[Cell]) -> Vec<Verdict> {
    columns
        .iter()
        .map(|column| {
            let cells = column
                .left
                .and_then(|idx| left.get(idx))
                .zip(column.right.and_then(|idx| right.get(idx)));
            match cells {
                Some((l, r)) => compare_cells(l, r),
                None => Verdict::NotAvailable,
            }
        })
        .collect()
}

/// Verdicts for every matched row of the alignment, in join order.
pub fn diff(alignment: &Alignment) -> Vec<RowComparison> {
    alignment
        .rows()
        .iter()
        .filter_map(|row| match row.pairing {
            Pairing::Both { left, right } => {
                let left = alignment.left().row(left)?;
                let right = alignment.right().row(right)?;
                Some(RowComparison {
                    key: row.key.clone(),
                    verdicts: compare_row(alignment.columns(), left, right),
                })
            }
            Pairing::LeftOnly(_) | Pairing::RightOnly(_) => None,
        })
        .collect()
}
