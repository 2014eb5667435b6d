//! Geoplot - filters `geodata.csv` to latitudes above 40 and saves
//! the scatter plot as `geolocation_plot.png`.

use anyhow::anyhow;
use geoplot::{run, PipelineConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = PipelineConfig::default();
    let report = run(&config, &mut std::io::stdout().lock())
        .map_err(|e| anyhow!("{}: {e}", e.kind()))?;

    log::info!(
        "plotted {} of {} rows to {}",
        report.filtered_rows,
        report.loaded_rows,
        report.output.display()
    );
    Ok(())
}
