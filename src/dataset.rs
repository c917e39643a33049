//! In-memory tabular data.
//!
//! A [`Table`] holds ordered headers and rows of [`Cell`]s aligned with them.
//! Header names are unique once case-folded, so lookups may ignore case.

use std::collections::HashSet;

use crate::{
    data::Cell,
    error::{CompareError, Result, SourceSide},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Builds a table, padding or truncating each row to the header width.
    pub fn new(side: SourceSide, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        ensure_unique_headers(side, &headers)?;
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::empty());
                row
            })
            .collect();
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&[Cell]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Exact header lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Case-insensitive header lookup.
    pub fn column_index_ignore_case(&self, name: &str) -> Option<usize> {
        self.column_index(name).or_else(|| {
            let folded = name.to_lowercase();
            self.headers.iter().position(|h| h.to_lowercase() == folded)
        })
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index_ignore_case(name).is_some()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    pub(crate) fn rename_column(&mut self, idx: usize, name: &str) {
        if let Some(header) = self.headers.get_mut(idx) {
            *header = name.to_string();
        }
    }

    /// Lower-cases every header, failing if two collapse to the same name.
    pub(crate) fn fold_headers(&mut self, side: SourceSide) -> Result<()> {
        let folded = self
            .headers
            .iter()
            .map(|h| h.to_lowercase())
            .collect::<Vec<_>>();
        ensure_unique_headers(side, &folded)?;
        self.headers = folded;
        Ok(())
    }

    pub(crate) fn column_mut(&mut self, idx: usize) -> impl Iterator<Item = &mut Cell> {
        self.rows.iter_mut().filter_map(move |row| row.get_mut(idx))
    }

    /// Stable reorder of rows by the given permutation.
    pub(crate) fn reorder(&mut self, order: &[usize]) {
        let mut taken = std::mem::take(&mut self.rows)
            .into_iter()
            .map(Some)
            .collect::<Vec<_>>();
        self.rows = order
            .iter()
            .filter_map(|idx| taken.get_mut(*idx).and_then(Option::take))
            .collect();
    }
}

fn ensure_unique_headers(side: SourceSide, headers: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(headers.len());
    for header in headers {
        if !seen.insert(header.to_lowercase()) {
            return Err(CompareError::DuplicateColumn {
                file: side,
                column: header.clone(),
            });
        }
    }
    Ok(())
}
