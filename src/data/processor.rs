//! Data Processor Module
//! Applies the latitude predicate that selects which records get plotted.

use polars::prelude::*;
use thiserror::Error;

use super::loader::{is_numeric, Dataset, LATITUDE, LONGITUDE};
use crate::error::ErrorKind;

/// Rows at or below this latitude are dropped.
pub const LATITUDE_THRESHOLD: f64 = 40.0;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("column '{0}' is missing")]
    MissingColumn(&'static str),
    #[error("column '{column}' has type {dtype}, expected a numeric type")]
    NonNumericColumn { column: &'static str, dtype: String },
    #[error("threshold {0} is not a finite number")]
    InvalidThreshold(f64),
}

impl ProcessorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProcessorError::PolarsError(_) => ErrorKind::Parse,
            ProcessorError::MissingColumn(_)
            | ProcessorError::NonNumericColumn { .. }
            | ProcessorError::InvalidThreshold(_) => ErrorKind::Schema,
        }
    }
}

/// Rows of a [`Dataset`] whose latitude is strictly above a threshold.
///
/// Same schema and relative row order as the source; may be empty.
#[derive(Debug, Clone)]
pub struct FilteredDataset {
    df: DataFrame,
    threshold: f64,
}

impl FilteredDataset {
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Mean longitude and latitude of the kept points, `None` when empty.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let mean = |name: &str| -> Option<f64> {
            self.df
                .column(name)
                .ok()?
                .as_materialized_series()
                .mean()
        };
        Some((mean(LONGITUDE)?, mean(LATITUDE)?))
    }
}

/// Handles row selection on loaded data.
pub struct DataProcessor;

impl DataProcessor {
    /// Keep the rows of `dataset` with `latitude > threshold`.
    pub fn filter_dataset(
        dataset: &Dataset,
        threshold: f64,
    ) -> Result<FilteredDataset, ProcessorError> {
        let df = Self::filter_by_latitude(dataset.frame(), threshold)?;
        log::info!(
            "latitude > {threshold}: kept {} of {} rows",
            df.height(),
            dataset.len()
        );
        Ok(FilteredDataset { df, threshold })
    }

    /// Filter a DataFrame on `latitude > threshold`, preserving order and columns.
    pub fn filter_by_latitude(
        df: &DataFrame,
        threshold: f64,
    ) -> Result<DataFrame, ProcessorError> {
        if !threshold.is_finite() {
            return Err(ProcessorError::InvalidThreshold(threshold));
        }

        let column = df
            .column(LATITUDE)
            .map_err(|_| ProcessorError::MissingColumn(LATITUDE))?;
        if !is_numeric(column.dtype()) {
            return Err(ProcessorError::NonNumericColumn {
                column: LATITUDE,
                dtype: column.dtype().to_string(),
            });
        }

        let filtered = df
            .clone()
            .lazy()
            .filter(col(LATITUDE).gt(lit(threshold)))
            .collect()?;
        Ok(filtered)
    }
}
