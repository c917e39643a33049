//! Comparison configuration.
//!
//! Loaded from JSON (or YAML for `.yml`/`.yaml` files):
//!
//! ```json
//! {
//!   "file1": { "key_column": "Invoice", "sheet_name": "Sheet1" },
//!   "file2": { "key_column": "invoice_no" },
//!   "columns_to_compare": ["Amount", "Due Date"],
//!   "date_columns": ["Due Date"],
//!   "output_path": "comparison_report.xlsx"
//! }
//! ```

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{CompareError, SourceSide};

pub const DEFAULT_OUTPUT_PATH: &str = "comparison_report.xlsx";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub key_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    pub file1: SourceConfig,
    pub file2: SourceConfig,
    pub columns_to_compare: Vec<String>,
    #[serde(default)]
    pub date_columns: Vec<String>,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                ConfigFormat::Yaml
            }
            _ => ConfigFormat::Json,
        }
    }
}

impl ComparisonConfig {
    pub fn new(
        file1_key: impl Into<String>,
        file2_key: impl Into<String>,
        columns_to_compare: &[&str],
    ) -> Self {
        Self {
            file1: SourceConfig {
                key_column: file1_key.into(),
                sheet_name: None,
            },
            file2: SourceConfig {
                key_column: file2_key.into(),
                sheet_name: None,
            },
            columns_to_compare: columns_to_compare.iter().map(|c| c.to_string()).collect(),
            date_columns: Vec::new(),
            output_path: default_output_path(),
        }
    }

    pub fn with_date_columns(mut self, columns: &[&str]) -> Self {
        self.date_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn source(&self, side: SourceSide) -> &SourceConfig {
        match side {
            SourceSide::File1 => &self.file1,
            SourceSide::File2 => &self.file2,
        }
    }

    /// Parses and validates a config document.
    pub fn parse(text: &str, format: ConfigFormat) -> Result<Self, CompareError> {
        let config: ComparisonConfig = match format {
            ConfigFormat::Json => serde_json::from_str(text)
                .map_err(|err| CompareError::ConfigParse(err.to_string()))?,
            ConfigFormat::Yaml => serde_yaml::from_str(text)
                .map_err(|err| CompareError::ConfigParse(err.to_string()))?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config = Self::parse(&text, ConfigFormat::from_path(path))
            .with_context(|| format!("Loading config from {path:?}"))?;
        Ok(config)
    }

    /// Checks the structural rules that do not depend on the data.
    pub fn validate(&self) -> Result<(), CompareError> {
        for side in [SourceSide::File1, SourceSide::File2] {
            let source = self.source(side);
            if source.key_column.trim().is_empty() {
                return Err(CompareError::config(
                    format!("{}.key_column", side.config_section()),
                    "must name a column",
                ));
            }
            if let Some(sheet) = &source.sheet_name {
                if sheet.trim().is_empty() {
                    return Err(CompareError::config(
                        format!("{}.sheet_name", side.config_section()),
                        "must not be blank when provided",
                    ));
                }
            }
        }

        let mut seen = HashSet::new();
        for column in &self.columns_to_compare {
            if column.trim().is_empty() {
                return Err(CompareError::config(
                    "columns_to_compare",
                    "column names must not be blank",
                ));
            }
            if !seen.insert(column.to_lowercase()) {
                return Err(CompareError::config(
                    "columns_to_compare",
                    format!("column '{column}' is listed more than once"),
                ));
            }
        }
        if self.columns_to_compare.is_empty() {
            warn!("columns_to_compare is empty; only key presence will be reported");
        }

        if self.date_columns.iter().any(|c| c.trim().is_empty()) {
            return Err(CompareError::config(
                "date_columns",
                "column names must not be blank",
            ));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(CompareError::config("output_path", "must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "file1": { "key_column": "ID", "sheet_name": "Orders" },
        "file2": { "key_column": "order_id" },
        "columns_to_compare": ["Amount", "Date"],
        "date_columns": ["Date"]
    }"#;

    #[test]
    fn parses_json_with_defaults() {
        let config = ComparisonConfig::parse(SAMPLE, ConfigFormat::Json).expect("config");
        assert_eq!(config.file1.key_column, "ID");
        assert_eq!(config.file1.sheet_name.as_deref(), Some("Orders"));
        assert_eq!(config.file2.sheet_name, None);
        assert_eq!(config.columns_to_compare, vec!["Amount", "Date"]);
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_OUTPUT_PATH));
    }

    #[test]
    fn parses_yaml() {
        let yaml = "file1:\n  key_column: id\nfile2:\n  key_column: id\ncolumns_to_compare: [amt]\noutput_path: out/report.xlsx\n";
        let config = ComparisonConfig::parse(yaml, ConfigFormat::Yaml).expect("config");
        assert!(config.date_columns.is_empty());
        assert_eq!(config.output_path, PathBuf::from("out/report.xlsx"));
    }

    #[test]
    fn missing_required_field_is_a_parse_error() {
        let err = ComparisonConfig::parse(
            r#"{"file1": {"key_column": "id"}, "columns_to_compare": []}"#,
            ConfigFormat::Json,
        )
        .expect_err("file2 missing");
        assert!(err.to_string().contains("file2"), "{err}");
    }

    #[test]
    fn blank_key_column_names_the_field() {
        let mut config = ComparisonConfig::new("id", " ", &["amt"]);
        let err = config.validate().expect_err("blank key");
        assert!(err.to_string().contains("file2.key_column"), "{err}");

        config.file2.key_column = "id".into();
        config.validate().expect("valid after fix");
    }

    #[test]
    fn duplicate_compare_columns_are_rejected_case_insensitively() {
        let config = ComparisonConfig::new("id", "id", &["Amount", "amount"]);
        let err = config.validate().expect_err("duplicate column");
        assert!(err.to_string().contains("columns_to_compare"), "{err}");
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("cfg.YAML")),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("cfg.json")),
            ConfigFormat::Json
        );
    }
}
