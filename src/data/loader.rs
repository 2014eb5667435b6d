//! CSV Data Loader Module
//! Reads the geolocation CSV with Polars and normalises the coordinate columns.

use polars::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::ErrorKind;

pub const LONGITUDE: &str = "longitude";
pub const LATITUDE: &str = "latitude";

/// Columns every input file must name in its header.
pub const REQUIRED_COLUMNS: [&str; 2] = [LONGITUDE, LATITUDE];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("required column '{0}' is missing from the header")]
    MissingColumn(&'static str),
    #[error("column '{column}', row {row}: {reason}")]
    BadValue {
        column: &'static str,
        row: usize,
        reason: String,
    },
}

impl LoaderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoaderError::NotFound(_) => ErrorKind::NotFound,
            LoaderError::MissingColumn(_) => ErrorKind::Schema,
            LoaderError::Unreadable { .. }
            | LoaderError::CsvError(_)
            | LoaderError::BadValue { .. } => ErrorKind::Parse,
        }
    }
}

/// Immutable table of records read from the input file.
///
/// `longitude` and `latitude` are guaranteed to be finite `Float64` columns;
/// every other column is carried through exactly as Polars inferred it.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
    source: Option<PathBuf>,
}

impl Dataset {
    /// Wrap an in-memory DataFrame, applying the same column checks as the CSV path.
    pub fn from_frame(df: DataFrame) -> Result<Self, LoaderError> {
        Ok(Self {
            df: normalize_coordinates(df)?,
            source: None,
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Column names in header order.
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// First `n` rows, for console previews.
    pub fn preview(&self, n: usize) -> DataFrame {
        self.df.head(Some(n))
    }
}

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file into a [`Dataset`]. No partial dataset is ever returned.
    pub fn load_csv(file_path: impl AsRef<Path>) -> Result<Dataset, LoaderError> {
        let path = file_path.as_ref();

        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return Err(LoaderError::Unreadable {
                    path: path.to_path_buf(),
                    source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LoaderError::NotFound(path.to_path_buf()))
            }
            Err(source) => {
                return Err(LoaderError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        log::debug!(
            "read {} rows x {} columns from {}",
            df.height(),
            df.width(),
            path.display()
        );

        Ok(Dataset {
            df: normalize_coordinates(df)?,
            source: Some(path.to_path_buf()),
        })
    }
}

/// Check the required columns exist and coerce each of them to finite `Float64`.
fn normalize_coordinates(mut df: DataFrame) -> Result<DataFrame, LoaderError> {
    for name in REQUIRED_COLUMNS {
        let column = df
            .column(name)
            .map_err(|_| LoaderError::MissingColumn(name))?;
        let values = coordinate_values(name, column)?;
        df.with_column(Column::new(name.into(), values))?;
    }
    Ok(df)
}

fn coordinate_values(name: &'static str, column: &Column) -> Result<Vec<f64>, LoaderError> {
    let bad = |row: usize, reason: String| LoaderError::BadValue {
        column: name,
        row: row + 1,
        reason,
    };

    let parsed: Vec<Option<f64>> = match column.dtype() {
        DataType::String => {
            // Values padded with whitespace (e.g. ", 37.57") are inferred as text.
            let series = column.as_materialized_series();
            let ca = series.str()?;
            ca.iter()
                .enumerate()
                .map(|(i, v)| match v.map(str::trim) {
                    None | Some("") => Ok(None),
                    Some(text) => text
                        .parse::<f64>()
                        .map(Some)
                        .map_err(|_| bad(i, format!("'{text}' is not a number"))),
                })
                .collect::<Result<_, _>>()?
        }
        dtype if is_numeric(dtype) => {
            let cast = column.cast(&DataType::Float64)?;
            cast.f64()?.iter().collect()
        }
        other => {
            return Err(LoaderError::BadValue {
                column: name,
                row: 1,
                reason: format!("values of type {other} cannot be read as numbers"),
            })
        }
    };

    parsed
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            None => Err(bad(i, "missing value".to_string())),
            Some(x) if !x.is_finite() => Err(bad(i, format!("{x} is not a finite number"))),
            Some(x) => Ok(x),
        })
        .collect()
}

pub(crate) fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}
