//! Voxname CLI: normalize, recognize and rename the recordings of a data root.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use voxname::engine::arg_parser::Cli;
use voxname::engine::handle_run;

fn main() -> Result<()> {
    let started = Instant::now();
    let summary = handle_run(&Cli::parse())?;
    log::debug!(
        "{}/{} file(s) renamed in {:.2?}",
        summary.renamed,
        summary.listed,
        started.elapsed()
    );
    Ok(())
}
