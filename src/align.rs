//! Key-based alignment of two tables.
//!
//! Both inputs are copied, their key columns renamed to a shared name, headers
//! lower-cased and date columns normalized. The copies are then stable-sorted by
//! key and full-outer-joined. Duplicate keys produce every left/right
//! combination.

use std::{cmp::Ordering, ops::Range};

use itertools::{EitherOrBoth, Itertools};
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    config::ComparisonConfig,
    data::{Cell, MissingReason, Value},
    dataset::Table,
    error::{CompareError, Result, SourceSide},
    normalize::normalize_dates,
};

/// Shared logical name given to both key columns before case-folding.
pub const KEY_COLUMN: &str = "KeyColumn";

static MISSING_KEY: Cell = Cell::Missing(MissingReason::Empty);

/// Type family of a join key. Keys can only be ordered within one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyFamily {
    Text,
    Number,
    Boolean,
    Temporal,
}

impl KeyFamily {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => KeyFamily::Text,
            Value::Integer(_) | Value::Float(_) => KeyFamily::Number,
            Value::Boolean(_) => KeyFamily::Boolean,
            Value::Date(_) | Value::DateTime(_) => KeyFamily::Temporal,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            KeyFamily::Text => "text",
            KeyFamily::Number => "numeric",
            KeyFamily::Boolean => "boolean",
            KeyFamily::Temporal => "date",
        }
    }
}

/// Outer-join tag of an aligned row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinSide {
    Both,
    LeftOnly,
    RightOnly,
}

/// Row references into the aligned copies of the two tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    Both { left: usize, right: usize },
    LeftOnly(usize),
    RightOnly(usize),
}

impl Pairing {
    pub fn side(&self) -> JoinSide {
        match self {
            Pairing::Both { .. } => JoinSide::Both,
            Pairing::LeftOnly(_) => JoinSide::LeftOnly,
            Pairing::RightOnly(_) => JoinSide::RightOnly,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub key: Cell,
    pub pairing: Pairing,
}

/// Where a compared column lives on each side, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPair {
    pub name: String,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Alignment {
    left: Table,
    right: Table,
    columns: Vec<ColumnPair>,
    rows: Vec<AlignedRow>,
}

impl Alignment {
    /// Sorted, renamed and normalized copy of file 1.
    pub fn left(&self) -> &Table {
        &self.left
    }

    /// Sorted, renamed and normalized copy of file 2.
    pub fn right(&self) -> &Table {
        &self.right
    }

    /// Compared columns in configured order, case-folded.
    pub fn columns(&self) -> &[ColumnPair] {
        &self.columns
    }

    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    pub fn count(&self, side: JoinSide) -> usize {
        self.rows
            .iter()
            .filter(|row| row.pairing.side() == side)
            .count()
    }
}

pub fn align(left: &Table, right: &Table, config: &ComparisonConfig) -> Result<Alignment> {
    let columns_to_compare = fold_names(&config.columns_to_compare);
    let date_columns = fold_names(&config.date_columns);

    let mut left = prepare(left, SourceSide::File1, &config.file1.key_column)?;
    let mut right = prepare(right, SourceSide::File2, &config.file2.key_column)?;

    let original_keys = [
        config.file1.key_column.to_lowercase(),
        config.file2.key_column.to_lowercase(),
    ];
    let shared_key = KEY_COLUMN.to_lowercase();
    // The shared key has no per-side counterpart to compare against.
    let columns = columns_to_compare
        .iter()
        .map(|name| {
            let is_key = *name == shared_key;
            ColumnPair {
                name: name.clone(),
                left: left.column_index(name).filter(|_| !is_key),
                right: right.column_index(name).filter(|_| !is_key),
            }
        })
        .collect::<Vec<_>>();
    for column in &columns {
        if column.left.is_none()
            && column.right.is_none()
            && column.name != shared_key
            && !original_keys.contains(&column.name)
        {
            return Err(CompareError::config(
                "columns_to_compare",
                format!("column '{}' exists in neither file", column.name),
            ));
        }
    }
    for column in &date_columns {
        if !left.has_column(column) && !right.has_column(column) {
            warn!("Date column '{column}' exists in neither file");
        }
    }

    let coerced = normalize_dates(&mut left, &date_columns) + normalize_dates(&mut right, &date_columns);
    if coerced > 0 {
        debug!("{coerced} date cell(s) coerced to missing");
    }

    let key_idx_left = key_index(&left);
    let key_idx_right = key_index(&right);
    check_key_families(&left, key_idx_left, &right, key_idx_right)?;

    sort_by_key(&mut left, key_idx_left);
    sort_by_key(&mut right, key_idx_right);

    let rows = outer_join(&left, key_idx_left, &right, key_idx_right);
    let alignment = Alignment {
        left,
        right,
        columns,
        rows,
    };
    info!(
        "Aligned {} row(s) from file 1 and {} row(s) from file 2: {} matched, {} only in file 1, {} only in file 2",
        alignment.left.row_count(),
        alignment.right.row_count(),
        alignment.count(JoinSide::Both),
        alignment.count(JoinSide::LeftOnly),
        alignment.count(JoinSide::RightOnly),
    );
    Ok(alignment)
}

fn fold_names(names: &[String]) -> Vec<String> {
    names.iter().map(|name| name.trim().to_lowercase()).collect()
}

/// Copies the table, renames its key column and folds header case.
fn prepare(table: &Table, side: SourceSide, key_column: &str) -> Result<Table> {
    let key_column = key_column.trim();
    let idx = table
        .column_index(key_column)
        .or_else(|| table.column_index_ignore_case(key_column))
        .ok_or_else(|| CompareError::MissingKeyColumn {
            file: side,
            column: key_column.to_string(),
        })?;
    let mut copy = table.clone();
    copy.rename_column(idx, KEY_COLUMN);
    copy.fold_headers(side)?;
    Ok(copy)
}

fn key_index(table: &Table) -> usize {
    // `prepare` guarantees the renamed key column exists.
    table
        .column_index(&KEY_COLUMN.to_lowercase())
        .unwrap_or_default()
}

fn key_at(table: &Table, row: usize, key_idx: usize) -> &Cell {
    table.cell(row, key_idx).unwrap_or(&MISSING_KEY)
}

fn check_key_families(
    left: &Table,
    key_idx_left: usize,
    right: &Table,
    key_idx_right: usize,
) -> Result<()> {
    let mut expected: Option<KeyFamily> = None;
    let sides = [
        (SourceSide::File1, left, key_idx_left),
        (SourceSide::File2, right, key_idx_right),
    ];
    for (side, table, key_idx) in sides {
        for row in table.rows() {
            let Some(value) = row.get(key_idx).and_then(Cell::as_value) else {
                continue;
            };
            let family = KeyFamily::of(value);
            match expected {
                None => expected = Some(family),
                Some(first) if first != family => {
                    return Err(CompareError::KeyType {
                        file: side,
                        expected: first.name(),
                        found: family.name(),
                    });
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

/// Orders keys ascending with missing keys last. Keys from different families
/// fall back to family order; [`check_key_families`] rules that out before
/// sorting.
pub fn compare_keys(a: &Cell, b: &Cell) -> Ordering {
    match (a.as_value(), b.as_value()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare_key_values(a, b),
    }
}

fn compare_key_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
        (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
        (Value::Date(a), Value::Date(b)) => a.cmp(b),
        (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
        (Value::Date(a), Value::DateTime(b)) => a.and_time(chrono::NaiveTime::MIN).cmp(b),
        (Value::DateTime(a), Value::Date(b)) => a.cmp(&b.and_time(chrono::NaiveTime::MIN)),
        (Value::Float(a), Value::Float(b)) => positive_zero(*a).total_cmp(&positive_zero(*b)),
        (Value::Integer(a), Value::Float(b)) => compare_int_float(*a, *b),
        (Value::Float(a), Value::Integer(b)) => compare_int_float(*b, *a).reverse(),
        _ => KeyFamily::of(a).cmp(&KeyFamily::of(b)),
    }
}

fn positive_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

/// Exact ordering of an integer against a float, consistent with
/// `positive_zero` + `total_cmp` between floats and `i64::cmp` between integers.
fn compare_int_float(int: i64, float: f64) -> Ordering {
    // 2^63, the first float above every i64.
    const I64_END: f64 = 9_223_372_036_854_775_808.0;
    if float.is_nan() {
        return if float.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    let floor = float.floor();
    if floor >= I64_END {
        return Ordering::Less;
    }
    if floor < -I64_END {
        return Ordering::Greater;
    }
    match int.cmp(&(floor as i64)) {
        Ordering::Equal if float > floor => Ordering::Less,
        other => other,
    }
}

fn sort_by_key(table: &mut Table, key_idx: usize) {
    let mut order = (0..table.row_count()).collect::<Vec<_>>();
    order.sort_by(|a, b| compare_keys(key_at(table, *a, key_idx), key_at(table, *b, key_idx)));
    table.reorder(&order);
}

/// Consecutive row ranges sharing one key in a sorted table.
fn key_runs(table: &Table, key_idx: usize) -> Vec<Range<usize>> {
    (0..table.row_count())
        .map(|idx| idx..idx + 1)
        .coalesce(|prev, next| {
            let same = compare_keys(
                key_at(table, prev.start, key_idx),
                key_at(table, next.start, key_idx),
            ) == Ordering::Equal;
            if same {
                Ok(prev.start..next.end)
            } else {
                Err((prev, next))
            }
        })
        .collect()
}

fn outer_join(
    left: &Table,
    key_idx_left: usize,
    right: &Table,
    key_idx_right: usize,
) -> Vec<AlignedRow> {
    let left_runs = key_runs(left, key_idx_left);
    let right_runs = key_runs(right, key_idx_right);
    let mut rows = Vec::with_capacity(left.row_count().max(right.row_count()));

    for group in left_runs
        .into_iter()
        .merge_join_by(right_runs, |l, r| {
            compare_keys(
                key_at(left, l.start, key_idx_left),
                key_at(right, r.start, key_idx_right),
            )
        })
    {
        match group {
            EitherOrBoth::Both(l, r) => {
                for (li, ri) in l.cartesian_product(r) {
                    rows.push(AlignedRow {
                        key: key_at(left, li, key_idx_left).clone(),
                        pairing: Pairing::Both {
                            left: li,
                            right: ri,
                        },
                    });
                }
            }
            EitherOrBoth::Left(l) => rows.extend(l.map(|li| AlignedRow {
                key: key_at(left, li, key_idx_left).clone(),
                pairing: Pairing::LeftOnly(li),
            })),
            EitherOrBoth::Right(r) => rows.extend(r.map(|ri| AlignedRow {
                key: key_at(right, ri, key_idx_right).clone(),
                pairing: Pairing::RightOnly(ri),
            })),
        }
    }
    rows
}
