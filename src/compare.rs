use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    align::align,
    cli::CompareArgs,
    config::ComparisonConfig,
    dataset::Table,
    error::{CompareError, SourceSide},
    io_utils,
    report::{ComparisonReport, assemble},
    source::{SourceOptions, load_table},
    table, writer,
};

/// Runs the full comparison of two loaded tables.
///
/// Pure: the inputs are not modified and nothing is written.
pub fn compare_tables(
    file1: &Table,
    file2: &Table,
    config: &ComparisonConfig,
) -> Result<ComparisonReport, CompareError> {
    config.validate()?;
    let alignment = align(file1, file2, config)?;
    let report = assemble(&alignment);
    info!(
        "Comparison complete: {} matched record(s), {} with differences, {} not matched",
        report.summary.matched_records,
        report.mismatched_rows(),
        report.summary.not_matched_records
    );
    Ok(report)
}

pub fn execute(args: &CompareArgs) -> Result<()> {
    let config = ComparisonConfig::load(&args.config)?;
    debug!("Loaded config from {:?}: {:?}", args.config, config);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;

    let load = |path: &Path, side: SourceSide| {
        let options = SourceOptions {
            delimiter: args.delimiter,
            encoding,
            ..SourceOptions::new(side).with_sheet(config.source(side).sheet_name.clone())
        };
        load_table(path, &options).with_context(|| format!("Loading {side} from {path:?}"))
    };
    let file1 = load(&args.file1, SourceSide::File1)?;
    let file2 = load(&args.file2, SourceSide::File2)?;

    let report = compare_tables(&file1, &file2, &config)
        .with_context(|| format!("Comparing {:?} with {:?}", args.file1, args.file2))?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&report).context("Serializing report")?;
        println!("{rendered}");
    } else if !args.quiet {
        let rendered = serde_json::to_string_pretty(&config).context("Serializing config")?;
        println!("Config:\n{rendered}\n");
        for section in report.sections() {
            table::print_section(&section);
        }
    }

    if args.no_report {
        debug!("Skipping report workbook");
        return Ok(());
    }
    let destination = args
        .output
        .as_deref()
        .unwrap_or(config.output_path.as_path());
    writer::write_report(&report, destination)
        .with_context(|| format!("Writing comparison report to {destination:?}"))?;
    Ok(())
}
