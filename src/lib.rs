//! Geoplot - Geolocation CSV filter & static scatter plot exporter
//!
//! Loads a CSV of points, keeps those north of a fixed latitude, draws them
//! as a styled scatter plot and saves the result as a PNG.

pub mod charts;
pub mod data;
pub mod error;
pub mod export;
pub mod pipeline;

pub use error::{ErrorKind, PipelineError};
pub use pipeline::{run, PipelineConfig, PipelineReport};
