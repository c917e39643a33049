use std::fmt;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};

/// Canonical rendering of a missing cell.
pub const MISSING_DISPLAY: &str = "";

/// Excel's day zero for the 1900 date system (accounts for the 1900 leap bug).
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
/// Serial of 9999-12-31, the last date Excel can represent.
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Boolean(b) => b.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Why a cell carries no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingReason {
    /// The source cell was blank.
    Empty,
    /// The source cell held text that could not be coerced; the raw text is kept.
    Unparseable(String),
}

/// A single table cell: either a value or an explicit missing marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Value(Value),
    Missing(MissingReason),
}

impl Cell {
    pub fn empty() -> Self {
        Cell::Missing(MissingReason::Empty)
    }

    pub fn text(value: impl Into<String>) -> Self {
        Cell::Value(Value::String(value.into()))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Cell::Value(v) => Some(v),
            Cell::Missing(_) => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing(_))
    }

    /// Canonical string form used for value comparison and display.
    pub fn as_display(&self) -> String {
        match self {
            Cell::Value(v) => v.as_display(),
            Cell::Missing(_) => MISSING_DISPLAY.to_string(),
        }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        Cell::Value(value)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Value(v) => v.serialize(serializer),
            Cell::Missing(_) => serializer.serialize_none(),
        }
    }
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    // Month-first wins over day-first for ambiguous slash dates.
    const DATE_FORMATS: &[&str] = &[
        "%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y", "%Y%m%d",
    ];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%m/%d/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.naive_utc());
    }
    Err(anyhow!("Failed to parse '{value}' as datetime"))
}

/// Converts an Excel serial number (1900 date system) into a timestamp.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..=EXCEL_MAX_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    let (year, month, day) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(year, month, day)?.and_time(NaiveTime::MIN);
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

/// Converts a whole-day serial into a date, rejecting values outside Excel's range.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=EXCEL_MAX_SERIAL).contains(&serial) {
        return None;
    }
    excel_serial_to_datetime(serial).map(|dt| dt.date())
}

/// Reads `raw` as a number only when the number prints back as the trimmed
/// text, so `007`, `+5`, `1e3` and integers wider than `i64` are rejected.
pub fn parse_exact_number(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    let value = if let Ok(parsed) = trimmed.parse::<i64>() {
        Value::Integer(parsed)
    } else if looks_numeric(trimmed) {
        match trimmed.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => Value::Float(parsed),
            _ => return None,
        }
    } else {
        return None;
    };
    (value.as_display() == trimmed).then_some(value)
}

/// Interprets a raw text field from a delimited source.
///
/// Blank fields are missing. In a `numeric` column, fields become numbers so
/// that `10` read from text compares equal to `10` read from a workbook; all
/// other text is kept as written.
pub fn parse_text_cell(raw: &str, numeric: bool) -> Cell {
    if raw.trim().is_empty() {
        return Cell::empty();
    }
    match parse_exact_number(raw).filter(|_| numeric) {
        Some(value) => Cell::Value(value),
        None => Cell::Value(Value::String(raw.to_string())),
    }
}

// `f64::from_str` also accepts "inf", "NaN" and friends, which must stay text.
fn looks_numeric(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && value.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    #[test]
    fn parse_naive_date_supports_multiple_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert_eq!(parse_naive_date("2024-05-06").unwrap(), expected);
        assert_eq!(parse_naive_date("05/06/2024").unwrap(), expected);
        assert_eq!(parse_naive_date("2024/05/06").unwrap(), expected);
        assert_eq!(parse_naive_date("06.05.2024").unwrap(), expected);
    }

    #[test]
    fn parse_naive_date_falls_back_to_day_first() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 25).unwrap();
        assert_eq!(parse_naive_date("25/05/2024").unwrap(), expected);
    }

    #[test]
    fn parse_naive_datetime_supports_multiple_formats() {
        let expected =
            NaiveDateTime::parse_from_str("2024-05-06 14:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(
            parse_naive_datetime("2024-05-06T14:30:00").unwrap(),
            expected
        );
        assert_eq!(
            parse_naive_datetime("05/06/2024 14:30:00").unwrap(),
            expected
        );
        assert_eq!(parse_naive_datetime("2024-05-06 14:30").unwrap(), expected);
        assert_eq!(
            parse_naive_datetime("2024-05-06T14:30:00Z").unwrap(),
            expected
        );
    }

    #[test]
    fn excel_serials_map_to_calendar_dates() {
        assert_eq!(
            excel_serial_to_date(45292.0),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(
            excel_serial_to_date(1.0),
            NaiveDate::from_ymd_opt(1899, 12, 31)
        );
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(3_000_000.0), None);
    }

    #[test]
    fn float_display_drops_integral_fraction() {
        assert_eq!(Value::Float(10.0).as_display(), "10");
        assert_eq!(Value::Float(10.5).as_display(), "10.5");
        assert_eq!(Value::Integer(-3).as_display(), "-3");
    }

    #[test]
    fn parse_text_cell_infers_numbers_and_missing() {
        assert_eq!(parse_text_cell("   ", true), Cell::empty());
        assert_eq!(parse_text_cell("42", true), Cell::Value(Value::Integer(42)));
        assert_eq!(parse_text_cell("4.25", true), Cell::Value(Value::Float(4.25)));
        assert_eq!(parse_text_cell("42", false), Cell::text("42"));
        assert_eq!(parse_text_cell("NaN", true), Cell::text("NaN"));
        assert_eq!(parse_text_cell(" Yes ", false), Cell::text(" Yes "));
        assert_eq!(parse_text_cell("2024-01-01", true), Cell::text("2024-01-01"));
    }

    #[test]
    fn exact_numbers_must_print_back_unchanged() {
        assert_eq!(parse_exact_number(" 250 "), Some(Value::Integer(250)));
        assert_eq!(parse_exact_number("-3"), Some(Value::Integer(-3)));
        assert_eq!(parse_exact_number("75.5"), Some(Value::Float(75.5)));
        for text in ["007", "+5", "1e3", "1.0", "10.50", ".5", "-0", "12345678901234567890"] {
            assert_eq!(parse_exact_number(text), None, "{text}");
        }
    }

    #[test]
    fn missing_cells_render_as_empty_string() {
        assert_eq!(Cell::empty().as_display(), MISSING_DISPLAY);
        let unparsed = Cell::Missing(MissingReason::Unparseable("soon".into()));
        assert_eq!(unparsed.as_display(), MISSING_DISPLAY);
    }

    #[test]
    fn cells_serialize_untagged() {
        let cells = vec![
            Cell::Value(Value::Integer(7)),
            Cell::text("x"),
            Cell::empty(),
        ];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[7,"x",null]"#);
    }
}
