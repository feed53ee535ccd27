// src/dataset.rs

use anyhow::{anyhow, Result};
use polars::prelude::*;

/// An in-memory table backed by a polars `DataFrame`.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
}

impl Dataset {
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    /// Lazy view for building query plans.
    pub fn lazy(&self) -> LazyFrame {
        self.df.clone().lazy()
    }

    pub fn num_rows(&self) -> usize {
        self.df.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.get_column_index(name).is_some()
    }

    /// Fail with the list of known columns unless every name in `names` exists.
    pub fn require(&self, names: &[&str]) -> Result<()> {
        match names.iter().find(|n| !self.has_column(n)) {
            Some(missing) => Err(anyhow!(
                "cannot resolve column '{}' among [{}]",
                missing,
                self.column_names().join(", ")
            )),
            None => Ok(()),
        }
    }

    pub fn dtype(&self, name: &str) -> Result<DataType> {
        Ok(self.df.column(name)?.dtype().clone())
    }
}

impl From<DataFrame> for Dataset {
    fn from(df: DataFrame) -> Self {
        Self::new(df)
    }
}
