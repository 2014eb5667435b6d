//! Charts module - Scatter plot styling and rendering

mod plotter;
mod renderer;

pub use plotter::{PlotSpec, Rgb, TextSpec, FONT_FAMILY};
pub use renderer::{AxisLimits, RenderError, RenderedImage, StaticChartRenderer};
