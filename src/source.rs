//! Loading source tables from workbooks and delimited text files.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use calamine::{Data, Reader, open_workbook_auto};
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};

use crate::{
    data::{Cell, MissingReason, Value, excel_serial_to_datetime, parse_exact_number, parse_text_cell},
    dataset::Table,
    error::SourceSide,
    io_utils,
};

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

#[derive(Debug, Clone)]
pub struct SourceOptions {
    pub side: SourceSide,
    pub sheet_name: Option<String>,
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
}

impl SourceOptions {
    pub fn new(side: SourceSide) -> Self {
        Self {
            side,
            sheet_name: None,
            delimiter: None,
            encoding: UTF_8,
        }
    }

    pub fn with_sheet(mut self, sheet_name: Option<String>) -> Self {
        self.sheet_name = sheet_name;
        self
    }
}

pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

pub fn load_table(path: &Path, options: &SourceOptions) -> Result<Table> {
    let table = if is_workbook(path) {
        load_workbook(path, options)?
    } else {
        load_delimited(path, options)?
    };
    info!(
        "Loaded {} row(s) x {} column(s) from {:?} ({})",
        table.row_count(),
        table.headers().len(),
        path,
        options.side
    );
    Ok(table)
}

fn load_workbook(path: &Path, options: &SourceOptions) -> Result<Table> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("Opening workbook {path:?}"))?;
    let sheet_names = workbook.sheet_names();
    let sheet = match &options.sheet_name {
        Some(name) => sheet_names
            .iter()
            .find(|candidate| *candidate == name)
            .cloned()
            .ok_or_else(|| {
                anyhow!(
                    "Sheet '{name}' not found in {path:?} (available: {})",
                    sheet_names.join(", ")
                )
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("Workbook {path:?} contains no sheets"))?,
    };
    debug!("Reading sheet '{sheet}' from {path:?}");
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("Reading sheet '{sheet}' from {path:?}"))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_names(header_row.iter().map(data_to_header)),
        None => Vec::new(),
    };
    let mut body = rows
        .map(|row| row.iter().map(data_to_cell).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    while body
        .last()
        .is_some_and(|row| row.iter().all(Cell::is_missing))
    {
        body.pop();
    }
    Table::new(options.side, headers, body)
        .with_context(|| format!("Building table from sheet '{sheet}' in {path:?}"))
}

fn load_delimited(path: &Path, options: &SourceOptions) -> Result<Table> {
    if options.sheet_name.is_some() {
        debug!("Ignoring sheet name for delimited source {path:?}");
    }
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    debug!(
        "Reading {path:?} with delimiter '{}'",
        io_utils::printable_delimiter(delimiter)
    );
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, options.encoding)
        .with_context(|| format!("Reading headers from {path:?}"))?;
    if headers.is_empty() {
        bail!("{path:?} has no header row");
    }
    let headers = header_names(headers.into_iter());

    let mut records = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {} in {path:?}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&record, options.encoding)
            .with_context(|| format!("Decoding row {} in {path:?}", row_idx + 2))?;
        records.push(decoded);
    }
    let numeric = numeric_columns(&records, headers.len());
    let rows = records
        .iter()
        .map(|record| {
            record
                .iter()
                .zip(&numeric)
                .map(|(field, numeric)| parse_text_cell(field, *numeric))
                .collect()
        })
        .collect();
    Table::new(options.side, headers, rows)
        .with_context(|| format!("Building table from {path:?}"))
}

/// A delimited column reads as numbers only when every non-blank field in it
/// is an exact number.
fn numeric_columns(records: &[Vec<String>], width: usize) -> Vec<bool> {
    (0..width)
        .map(|col| {
            let mut fields = records
                .iter()
                .filter_map(|record| record.get(col))
                .filter(|field| !field.trim().is_empty())
                .peekable();
            fields.peek().is_some() && fields.all(|field| parse_exact_number(field).is_some())
        })
        .collect()
}

/// Trims header names and names blank ones after their position.
fn header_names(raw: impl Iterator<Item = String>) -> Vec<String> {
    raw.enumerate()
        .map(|(idx, name)| {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                format!("unnamed_{idx}")
            } else {
                trimmed.to_string()
            }
        })
        .collect()
}

fn data_to_header(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        other => data_to_cell(other).as_display(),
    }
}

pub fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::empty(),
        Data::String(s) if s.trim().is_empty() => Cell::empty(),
        Data::String(s) => Cell::Value(Value::String(s.clone())),
        Data::Int(i) => Cell::Value(Value::Integer(*i)),
        Data::Float(f) => Cell::Value(Value::Float(*f)),
        Data::Bool(b) => Cell::Value(Value::Boolean(*b)),
        Data::DateTime(dt) => match excel_serial_to_datetime(dt.as_f64()) {
            Some(ts) if ts.time() == chrono::NaiveTime::MIN => Cell::Value(Value::Date(ts.date())),
            Some(ts) => Cell::Value(Value::DateTime(ts)),
            None => Cell::Missing(MissingReason::Unparseable(dt.as_f64().to_string())),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Value(Value::String(s.clone())),
        Data::Error(e) => Cell::Missing(MissingReason::Unparseable(format!("#{e:?}"))),
    }
}
