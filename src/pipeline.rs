// src/pipeline.rs

use anyhow::Result;
use std::io::Write;
use tracing::info;

use crate::{
    aggregate::{self, Report},
    config::Config,
    input,
    output::{self, preview},
    session::Session,
};

/// Read, aggregate, write, then print previews to `out`.
///
/// The session lives for the whole call and is released on every return path.
pub fn run<W: Write>(config: &Config, out: &mut W) -> Result<Report> {
    let session = Session::start(&config.session)?;

    let dataset = input::read_csv(&session, &config.input)?;
    let report = aggregate::run_all(&session, &dataset)?;
    output::write_report(&session, &report, &config.output, &config.write)?;
    preview::print_report(out, &report, config.preview_rows)?;

    info!(output = %config.output.display(), "all done");
    session.stop();
    Ok(report)
}
