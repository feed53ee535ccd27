// src/output/mod.rs

pub mod preview;

use anyhow::{Context, Result};
use polars::prelude::*;
use rayon::prelude::*;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    aggregate::{Aggregation, Report, VACCINATION},
    session::Session,
};

pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// How results are laid out on disk.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Part files per result; rows are split into contiguous slices.
    pub partitions: usize,
    /// Write a header row into every part file.
    pub header: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            partitions: 1,
            header: false,
        }
    }
}

/// Write every result in `report` under `root/<name>`, returning the directories written.
///
/// Without a vaccination result any `root/vaccination` left by an earlier run
/// is removed, so the root only ever holds this run's results.
pub fn write_report(
    session: &Session,
    report: &Report,
    root: &Path,
    options: &WriteOptions,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(root)
        .with_context(|| format!("creating output root {}", root.display()))?;
    if report.vaccination.is_none() {
        clear_destination(&root.join(VACCINATION))?;
    }
    report
        .iter()
        .map(|agg| write_aggregation(session, agg, root, options))
        .collect()
}

/// Replace `root/<name>` with the result's part files plus a `_SUCCESS` marker.
///
/// Whatever was at the destination is removed first. Parts are named
/// `part-NNNNN-<job>-c000.csv` and concatenate back to the result's row order.
#[instrument(level = "info", skip(session, agg, root, options), fields(name = agg.name))]
pub fn write_aggregation(
    session: &Session,
    agg: &Aggregation,
    root: &Path,
    options: &WriteOptions,
) -> Result<PathBuf> {
    let dir = root.join(agg.name);
    clear_destination(&dir)?;
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let slices = partition(&agg.frame, options.partitions);
    let job = session.job_id();
    let parts: Vec<PathBuf> = session.install(|| {
        slices
            .into_par_iter()
            .enumerate()
            .map(|(i, slice)| write_part(&dir, i, job, slice, options.header))
            .collect::<Result<_>>()
    })?;

    let marker = dir.join(SUCCESS_MARKER);
    File::create(&marker).with_context(|| format!("creating {}", marker.display()))?;

    info!(
        dir = %dir.display(),
        rows = agg.num_rows(),
        parts = parts.len(),
        "wrote result"
    );
    Ok(dir)
}

fn clear_destination(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        debug!(dir = %dir.display(), "removing existing output");
        fs::remove_dir_all(dir).with_context(|| format!("removing {}", dir.display()))?;
    } else if dir.exists() {
        fs::remove_file(dir).with_context(|| format!("removing {}", dir.display()))?;
    }
    Ok(())
}

/// Split into at most `partitions` contiguous, non-empty slices.
fn partition(frame: &DataFrame, partitions: usize) -> Vec<DataFrame> {
    let rows = frame.height();
    if rows == 0 {
        return Vec::new();
    }
    let chunk = rows.div_ceil(partitions.max(1));
    (0..rows)
        .step_by(chunk)
        .map(|offset| frame.slice(offset as i64, chunk.min(rows - offset)))
        .collect()
}

fn write_part(
    dir: &Path,
    index: usize,
    job: Uuid,
    mut frame: DataFrame,
    header: bool,
) -> Result<PathBuf> {
    let path = dir.join(format!("part-{:05}-{}-c000.csv", index, job));
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    CsvWriter::new(&mut writer)
        .include_header(header)
        .finish(&mut frame)
        .with_context(|| format!("writing {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;

    debug!(path = %path.display(), rows = frame.height(), "wrote part");
    Ok(path)
}

/// Part files of a written result directory, in name (and therefore row) order.
pub fn part_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut parts: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("part-") && n.ends_with(".csv"))
                .unwrap_or(false)
        })
        .collect();
    parts.sort();
    Ok(parts)
}
