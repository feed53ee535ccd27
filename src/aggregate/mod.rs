// src/aggregate/mod.rs

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::{debug, info, instrument};

use crate::{dataset::Dataset, session::Session};

pub const TOP_CASES: &str = "top_cases";
pub const AVG_CASES: &str = "avg_cases";
pub const VACCINATION: &str = "vaccination";

/// A named, ordered aggregation result.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Output subdirectory name.
    pub name: &'static str,
    /// Banner shown above the preview.
    pub title: &'static str,
    pub frame: DataFrame,
}

impl Aggregation {
    pub fn num_rows(&self) -> usize {
        self.frame.height()
    }
}

/// Everything the pipeline computes from one input.
#[derive(Debug, Clone)]
pub struct Report {
    pub top_cases: Aggregation,
    pub avg_cases: Aggregation,
    /// Present only when the input has a `people_vaccinated` column.
    pub vaccination: Option<Aggregation>,
}

impl Report {
    /// Results in output order.
    pub fn iter(&self) -> impl Iterator<Item = &Aggregation> {
        [Some(&self.top_cases), Some(&self.avg_cases), self.vaccination.as_ref()]
            .into_iter()
            .flatten()
    }
}

/// Largest first, empty groups last. Ties keep first-appearance order.
fn largest_first() -> SortMultipleOptions {
    SortMultipleOptions::default()
        .with_order_descending(true)
        .with_nulls_last(true)
        .with_maintain_order(true)
}

/// Group by `key`, reduce with `agg`, then sort by `by`.
fn grouped(
    dataset: &Dataset,
    key: &str,
    agg: Expr,
    by: &str,
    sort: SortMultipleOptions,
) -> Result<DataFrame> {
    let df = dataset
        .lazy()
        .group_by_stable([col(key)])
        .agg([agg])
        .sort([by], sort)
        .collect()
        .with_context(|| format!("aggregating by {}", key))?;
    debug!(key, groups = df.height(), "grouped");
    Ok(df)
}

/// Max `total_cases` per `location`, largest first.
pub fn top_cases(dataset: &Dataset) -> Result<Aggregation> {
    dataset.require(&["location", "total_cases"])?;
    let frame = grouped(
        dataset,
        "location",
        col("total_cases").max().alias("max_cases"),
        "max_cases",
        largest_first(),
    )?;
    Ok(Aggregation {
        name: TOP_CASES,
        title: "Top Countries by Total Cases",
        frame,
    })
}

/// Mean `new_cases` per `date`, earliest first.
///
/// Values that do not parse as numbers count as null.
pub fn avg_cases(dataset: &Dataset) -> Result<Aggregation> {
    dataset.require(&["date", "new_cases"])?;
    let frame = grouped(
        dataset,
        "date",
        col("new_cases")
            .cast(DataType::Float64)
            .mean()
            .alias("avg_new_cases"),
        "date",
        SortMultipleOptions::default().with_maintain_order(true),
    )?;
    Ok(Aggregation {
        name: AVG_CASES,
        title: "Average New Cases per Day",
        frame,
    })
}

/// Max `people_vaccinated` per `location`, largest first; `None` without that column.
pub fn vaccination(dataset: &Dataset) -> Result<Option<Aggregation>> {
    if !dataset.has_column("people_vaccinated") {
        return Ok(None);
    }
    dataset.require(&["location"])?;
    let frame = grouped(
        dataset,
        "location",
        col("people_vaccinated").max().alias("max_vaccinated"),
        "max_vaccinated",
        largest_first(),
    )?;
    Ok(Some(Aggregation {
        name: VACCINATION,
        title: "Top Countries by People Vaccinated",
        frame,
    }))
}

/// Compute all three aggregations concurrently on the session's pool.
#[instrument(level = "info", skip_all, fields(rows = dataset.num_rows()))]
pub fn run_all(session: &Session, dataset: &Dataset) -> Result<Report> {
    let ((top, avg), vacc) = session.install(|| {
        rayon::join(
            || rayon::join(|| top_cases(dataset), || avg_cases(dataset)),
            || vaccination(dataset),
        )
    });

    let report = Report {
        top_cases: top?,
        avg_cases: avg?,
        vaccination: vacc?,
    };
    info!(
        top_cases = report.top_cases.num_rows(),
        avg_cases = report.avg_cases.num_rows(),
        vaccination = ?report.vaccination.as_ref().map(Aggregation::num_rows),
        "aggregations computed"
    );
    Ok(report)
}
