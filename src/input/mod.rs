// src/input/mod.rs

use anyhow::{bail, Context, Result};
use glob::{glob, Pattern};
use polars::lazy::dsl::concat;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::{dataset::Dataset, session::Session};

/// Load a CSV file, or every `*.csv` file directly inside a directory, into one dataset.
///
/// The header row names the columns and types are inferred from all records.
/// Several files are stacked by column name: missing columns become null and
/// conflicting types widen to their common supertype.
#[tracing::instrument(level = "info", skip(session, path), fields(path = %path.as_ref().display()))]
pub fn read_csv<P: AsRef<Path>>(session: &Session, path: P) -> Result<Dataset> {
    let files = list_input_files(path.as_ref())?;

    let frames: Vec<LazyFrame> = files
        .iter()
        .map(|f| scan_file(f))
        .collect::<Result<_>>()?;

    let lf = if frames.len() == 1 {
        frames.into_iter().next().context("no input frames")?
    } else {
        concat(
            frames,
            UnionArgs {
                parallel: true,
                rechunk: true,
                to_supertypes: true, // Int64 + Float64 -> Float64
                diagonal: true,      // missing columns -> null
                from_partitioned_ds: false,
                maintain_order: true,
            },
        )
        .context("Failed to concatenate input frames")?
    };

    let df = session
        .install(|| lf.collect())
        .with_context(|| format!("reading {}", path.as_ref().display()))?;
    info!(
        files = files.len(),
        rows = df.height(),
        columns = df.width(),
        "loaded input"
    );
    debug!(schema = ?df.schema(), "input schema");
    Ok(Dataset::new(df))
}

fn scan_file(path: &Path) -> Result<LazyFrame> {
    LazyCsvReader::new(path)
        .with_has_header(true)
        .with_separator(b',')
        .with_infer_schema_length(None)
        .finish()
        .with_context(|| format!("Failed to scan CSV file: {}", path.display()))
}

/// A file is read as-is; a directory yields its `*.csv` entries in name order,
/// skipping hidden (`.`) and metadata (`_`) files.
fn list_input_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        if !path.exists() {
            bail!("input path does not exist: {}", path.display());
        }
        return Ok(vec![path.to_path_buf()]);
    }

    // the directory part is literal; only the file part is a pattern
    let pattern = format!("{}/*.csv", Pattern::escape(&path.display().to_string()));
    let mut files: Vec<PathBuf> = glob(&pattern)
        .with_context(|| format!("Failed to read glob pattern '{}'", pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| !n.starts_with('.') && !n.starts_with('_'))
                .unwrap_or(false)
        })
        .collect();
    files.sort();

    if files.is_empty() {
        bail!("no CSV files found in {}", path.display());
    }
    debug!(count = files.len(), "input files");
    Ok(files)
}
