use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Compare two spreadsheets by key column", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare two files using a JSON or YAML comparison config
    Compare(CompareArgs),
    /// Preview the first rows of a workbook sheet or CSV file
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// First file (xlsx, xls, xlsb, ods, csv or tsv)
    #[arg(long = "file1")]
    pub file1: PathBuf,
    /// Second file (xlsx, xls, xlsb, ods, csv or tsv)
    #[arg(long = "file2")]
    pub file2: PathBuf,
    /// Comparison config file (.json, .yml or .yaml)
    #[arg(short, long)]
    pub config: PathBuf,
    /// Report destination (overrides output_path from the config)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Skip writing the report workbook
    #[arg(long = "no-report")]
    pub no_report: bool,
    /// Print the report as JSON instead of tables
    #[arg(long, conflicts_with = "quiet")]
    pub json: bool,
    /// Do not print the config or report sections
    #[arg(short, long)]
    pub quiet: bool,
    /// CSV delimiter character for delimited inputs (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of delimited inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input file to preview
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Sheet to read from a workbook (defaults to the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding for delimited input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
