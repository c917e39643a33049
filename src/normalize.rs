//! Date normalization for configured columns.
//!
//! Every cell of a date column is coerced to [`Value::Date`]. Cells that cannot
//! be interpreted become [`MissingReason::Unparseable`] instead of failing the
//! run.

use log::{debug, warn};

use crate::{
    data::{
        Cell, MissingReason, Value, excel_serial_to_date, parse_naive_date, parse_naive_datetime,
    },
    dataset::Table,
};

/// Normalizes the given columns in place and returns how many cells were
/// coerced to missing. Columns the table does not have are skipped.
pub fn normalize_dates(table: &mut Table, columns: &[String]) -> usize {
    let mut coerced = 0usize;
    for column in columns {
        let Some(idx) = table.column_index_ignore_case(column) else {
            debug!("Date column '{column}' not present; skipping");
            continue;
        };
        let mut column_coerced = 0usize;
        for cell in table.column_mut(idx) {
            let normalized = normalize_date_cell(cell);
            if normalized.is_missing() && !cell.is_missing() {
                column_coerced += 1;
            }
            *cell = normalized;
        }
        if column_coerced > 0 {
            warn!("{column_coerced} value(s) in date column '{column}' could not be parsed");
        }
        coerced += column_coerced;
    }
    coerced
}

pub fn normalize_date_cell(cell: &Cell) -> Cell {
    let value = match cell {
        Cell::Missing(_) => return cell.clone(),
        Cell::Value(value) => value,
    };
    let parsed = match value {
        Value::Date(d) => Some(*d),
        Value::DateTime(dt) => Some(dt.date()),
        Value::Integer(i) => excel_serial_to_date(*i as f64),
        Value::Float(f) => excel_serial_to_date(f.floor()),
        Value::String(s) => parse_date_text(s.trim()),
        Value::Boolean(_) => None,
    };
    match parsed {
        Some(date) => Cell::Value(Value::Date(date)),
        None => Cell::Missing(MissingReason::Unparseable(value.as_display())),
    }
}

fn parse_date_text(text: &str) -> Option<chrono::NaiveDate> {
    if text.is_empty() {
        return None;
    }
    parse_naive_date(text)
        .or_else(|_| parse_naive_datetime(text).map(|dt| dt.date()))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceSide;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> Cell {
        Cell::Value(Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap()))
    }

    #[test]
    fn mixed_encodings_normalize_to_the_same_date() {
        let expected = date(2024, 1, 1);
        assert_eq!(normalize_date_cell(&Cell::text("2024-01-01")), expected);
        assert_eq!(normalize_date_cell(&Cell::text(" 01/01/2024 ")), expected);
        assert_eq!(
            normalize_date_cell(&Cell::text("2024-01-01T08:15:00")),
            expected
        );
        assert_eq!(
            normalize_date_cell(&Cell::Value(Value::Integer(45292))),
            expected
        );
        assert_eq!(
            normalize_date_cell(&Cell::Value(Value::Float(45292.75))),
            expected
        );
    }

    #[test]
    fn unparseable_cells_keep_their_raw_text() {
        assert_eq!(
            normalize_date_cell(&Cell::text("next week")),
            Cell::Missing(MissingReason::Unparseable("next week".into()))
        );
        assert_eq!(
            normalize_date_cell(&Cell::Value(Value::Boolean(true))),
            Cell::Missing(MissingReason::Unparseable("true".into()))
        );
        assert_eq!(normalize_date_cell(&Cell::empty()), Cell::empty());
    }

    #[test]
    fn normalize_dates_only_touches_listed_columns() {
        let mut table = Table::new(
            SourceSide::File1,
            vec!["id".into(), "Due".into(), "note".into()],
            vec![
                vec![Cell::Value(Value::Integer(1)), Cell::text("2024-02-03"), Cell::text("2024-02-03")],
                vec![Cell::Value(Value::Integer(2)), Cell::text("bogus"), Cell::empty()],
            ],
        )
        .unwrap();

        let coerced = normalize_dates(&mut table, &["due".to_string(), "absent".to_string()]);

        assert_eq!(coerced, 1);
        assert_eq!(table.cell(0, 1), Some(&date(2024, 2, 3)));
        assert_eq!(table.cell(0, 2), Some(&Cell::text("2024-02-03")));
        assert!(table.cell(1, 1).unwrap().is_missing());
        assert_eq!(table.cell(1, 0), Some(&Cell::Value(Value::Integer(2))));
    }
}
