//! Writes the bundled sample geolocation CSV so `geoplot` has something to plot.
//!
//! Usage: `generate_sample [OUTPUT]` (default `geodata.csv`).

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

const SAMPLE: &str = include_str!("../../data/geodata_sample.csv");

fn main() -> Result<()> {
    let mut args = std::env::args_os().skip(1);
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(geoplot::pipeline::DEFAULT_INPUT));
    if args.next().is_some() {
        bail!("usage: generate_sample [OUTPUT]");
    }

    std::fs::write(&output, SAMPLE)
        .with_context(|| format!("writing {}", output.display()))?;

    let rows = SAMPLE.lines().skip(1).filter(|l| !l.trim().is_empty()).count();
    println!("Wrote {rows} locations to {}", output.display());
    Ok(())
}
