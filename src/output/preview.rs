// src/output/preview.rs

use anyhow::{Context, Result};
use polars::prelude::*;
use prettytable::{format, Cell, Row, Table};
use std::io::Write;

use crate::aggregate::{Aggregation, Report};

/// Banner plus an untruncated table of the first `limit` rows.
pub fn render(agg: &Aggregation, limit: usize) -> Result<String> {
    let total = agg.num_rows();
    let shown = agg.frame.head(Some(limit));

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_DEFAULT);
    table.set_titles(Row::new(
        shown
            .get_column_names()
            .into_iter()
            .map(|name| Cell::new(name.as_str()))
            .collect(),
    ));

    for i in 0..shown.height() {
        let cells = shown
            .get_columns()
            .iter()
            .map(|column| {
                let value = column
                    .get(i)
                    .with_context(|| format!("reading {} row {}", agg.name, i))?;
                Ok(cell(&value))
            })
            .collect::<Result<Vec<Cell>>>()?;
        table.add_row(Row::new(cells));
    }

    let mut out = format!("\n=== {} (sample) ===\n{}", agg.title, table);
    if total > limit {
        out.push_str(&format!("only showing top {} rows\n", limit));
    }
    Ok(out)
}

/// Strings print bare (polars would quote them), numbers right aligned.
fn cell(value: &AnyValue) -> Cell {
    match value {
        AnyValue::Null => Cell::new("null"),
        AnyValue::String(s) => Cell::new(s),
        AnyValue::StringOwned(s) => Cell::new(s.as_str()),
        other => Cell::new(&other.to_string()).style_spec("r"),
    }
}

/// Print a preview of every result in `report` to `out`.
pub fn print_report<W: Write>(out: &mut W, report: &Report, limit: usize) -> Result<()> {
    for agg in report.iter() {
        out.write_all(render(agg, limit)?.as_bytes())
            .context("writing preview")?;
    }
    out.flush().context("flushing preview")?;
    Ok(())
}
