// src/config.rs

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::{output::WriteOptions, paths, session::SessionConfig};

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "COVID-19 analytics: per-location case and vaccination maxima, per-day new case averages"
)]
pub struct Args {
    /// Input CSV file or directory (local path or file:// URI)
    #[arg(long)]
    pub input: String,

    /// Output root directory (local path or file:// URI)
    #[arg(long)]
    pub output: String,

    /// Part files written per result
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub partitions: u32,

    /// Rows printed per result preview
    #[arg(long, default_value_t = 10)]
    pub preview_rows: usize,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Write a header row into each part file
    #[arg(long)]
    pub header: bool,

    #[arg(long, default_value = "CovidAnalysis")]
    pub app_name: String,
}

/// Fully resolved run settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub session: SessionConfig,
    pub write: WriteOptions,
    pub preview_rows: usize,
}

impl Args {
    /// Resolve paths and split flags into per-stage settings.
    pub fn into_config(self) -> Result<Config> {
        Ok(Config {
            input: paths::resolve(&self.input)?,
            output: paths::resolve(&self.output)?,
            session: SessionConfig {
                app_name: self.app_name,
                threads: self.threads,
            },
            write: WriteOptions {
                partitions: self.partitions as usize,
                header: self.header,
            },
            preview_rows: self.preview_rows,
        })
    }
}
