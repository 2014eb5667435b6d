//! Pipeline orchestration: load, filter, render, export.

use polars::prelude::{CsvWriter, PolarsError, SerWriter};
use std::io::Write;
use std::path::PathBuf;

use crate::charts::{PlotSpec, StaticChartRenderer};
use crate::data::{DataLoader, DataProcessor, Dataset, FilteredDataset, LATITUDE_THRESHOLD};
use crate::error::PipelineError;
use crate::export::PngExporter;

pub const DEFAULT_INPUT: &str = "geodata.csv";
pub const DEFAULT_OUTPUT: &str = "geolocation_plot.png";

/// Rows shown in the raw data preview.
const PREVIEW_ROWS: usize = 5;

/// Everything a run needs; there is no other source of configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub threshold: f64,
    pub plot: PlotSpec,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            threshold: LATITUDE_THRESHOLD,
            plot: PlotSpec::default(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub loaded_rows: usize,
    pub filtered_rows: usize,
    pub bytes_written: u64,
    pub output: PathBuf,
}

/// Run the pipeline, printing the data preview and filtered rows to `console`.
///
/// Console write failures are logged and otherwise ignored.
pub fn run<W: Write>(
    config: &PipelineConfig,
    console: &mut W,
) -> Result<PipelineReport, PipelineError> {
    log::info!("loading {}", config.input.display());
    let dataset = DataLoader::load_csv(&config.input)?;
    log::info!(
        "loaded {} rows with columns {:?}",
        dataset.len(),
        dataset.column_names()
    );
    print_preview(console, &dataset);

    let filtered = DataProcessor::filter_dataset(&dataset, config.threshold)?;
    print_filtered(console, &filtered);
    if let Some((lon, lat)) = filtered.centroid() {
        log::info!("centroid of kept points: longitude {lon:.6}, latitude {lat:.6}");
    }

    let image = StaticChartRenderer::render(&filtered, &config.plot)?;
    let bytes_written = PngExporter::export(&image, &config.output)?;

    Ok(PipelineReport {
        loaded_rows: dataset.len(),
        filtered_rows: filtered.len(),
        bytes_written,
        output: config.output.clone(),
    })
}

fn print_preview<W: Write>(console: &mut W, dataset: &Dataset) {
    let result = writeln!(console, "Raw data:\n{}", dataset.preview(PREVIEW_ROWS));
    if let Err(e) = result {
        log::warn!("could not print data preview: {e}");
    }
}

fn print_filtered<W: Write>(console: &mut W, filtered: &FilteredDataset) {
    let result = writeln!(console, "Filtered data (latitude > {}):", filtered.threshold())
        .map_err(PolarsError::from)
        .and_then(|()| {
            let mut df = filtered.frame().clone();
            CsvWriter::new(&mut *console)
                .include_header(true)
                .finish(&mut df)
        });
    if let Err(e) = result {
        log::warn!("could not print filtered data: {e}");
    }
}
