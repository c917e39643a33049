//! Key-based comparison of two tabular sources.
//!
//! The engine ([`compare_tables`]) aligns two [`dataset::Table`]s on a
//! configured key column, diffs the configured columns of every matched row and
//! assembles a [`report::ComparisonReport`]. The binary wraps it with workbook
//! and CSV loading, console display and `.xlsx` report writing.

pub mod align;
pub mod cli;
pub mod compare;
pub mod config;
pub mod data;
pub mod dataset;
pub mod diff;
pub mod error;
pub mod io_utils;
pub mod normalize;
pub mod preview;
pub mod report;
pub mod source;
pub mod table;
pub mod writer;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use compare::compare_tables;
pub use config::ComparisonConfig;
pub use error::CompareError;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheet_compare", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Compare(args) => compare::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
    }
}
