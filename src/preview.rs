use anyhow::Result;
use log::info;

use crate::{
    cli::PreviewArgs,
    error::SourceSide,
    io_utils,
    source::{SourceOptions, load_table},
    table,
};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let options = SourceOptions {
        delimiter: args.delimiter,
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
        ..SourceOptions::new(SourceSide::File1).with_sheet(args.sheet.clone())
    };
    let source = load_table(&args.input, &options)?;
    let rows = source
        .rows()
        .iter()
        .take(args.rows)
        .map(|row| row.iter().map(|cell| cell.as_display()).collect())
        .collect::<Vec<Vec<String>>>();

    table::print_table(source.headers(), &rows);
    info!(
        "Displayed {} of {} row(s) from {:?}",
        rows.len(),
        source.row_count(),
        args.input
    );
    Ok(())
}
