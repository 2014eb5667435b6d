//! Plot Specification Module
//! The fixed styling applied to every geolocation scatter plot.

use plotters::style::RGBColor;
use serde::Serialize;

/// Colour palette
pub const INK: Rgb = Rgb(63, 61, 112); // #3F3D70, titles and panel
pub const POINT_GREEN: Rgb = Rgb(0, 255, 72); // #00FF48
pub const TICK_GREY: Rgb = Rgb(127, 140, 141); // #7F8C8D
pub const GRID_GREY: Rgb = Rgb(204, 204, 204); // #CCCCCC
pub const WHITE: Rgb = Rgb(255, 255, 255);

pub const FONT_FAMILY: &str = "sans-serif";

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_plotters(self) -> RGBColor {
        RGBColor(self.0, self.1, self.2)
    }
}

/// Font settings for one class of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextSpec {
    /// Pixel height.
    pub size: f64,
    pub bold: bool,
    pub color: Rgb,
}

/// Declarative description of the scatter plot.
///
/// Constructed once per run; the renderer reads it and never mutates it.
/// Axis limits are not part of the spec: they come from the data, see
/// [`AxisLimits`](crate::charts::AxisLimits).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSpec {
    /// Named style preset: white canvas, filled panel, major grid only.
    pub theme: String,
    /// Canvas size in pixels (width, height).
    pub canvas: (u32, u32),
    pub title: String,
    pub x_title: String,
    pub y_title: String,

    pub title_font: TextSpec,
    pub axis_title_font: TextSpec,
    pub tick_font: TextSpec,

    pub point_color: Rgb,
    /// Marker radius in pixels.
    pub point_radius: u32,
    /// Marker opacity in [0, 1].
    pub point_opacity: f64,

    pub grid_color: Rgb,
    pub panel_background: Rgb,
    pub background: Rgb,

    /// One x unit spans as many pixels as one y unit.
    pub lock_aspect: bool,

    pub margin: u32,
    pub x_label_area: u32,
    pub y_label_area: u32,
}

impl Default for PlotSpec {
    fn default() -> Self {
        Self {
            theme: "whitegrid".to_string(),
            canvas: (1200, 1200),
            title: "Geolocation data".to_string(),
            x_title: "Longitude".to_string(),
            y_title: "Latitude".to_string(),
            title_font: TextSpec {
                size: 32.0,
                bold: true,
                color: INK,
            },
            axis_title_font: TextSpec {
                size: 28.0,
                bold: true,
                color: INK,
            },
            tick_font: TextSpec {
                size: 24.0,
                bold: false,
                color: TICK_GREY,
            },
            point_color: POINT_GREEN,
            point_radius: 8,
            point_opacity: 0.8,
            grid_color: GRID_GREY,
            panel_background: INK,
            background: WHITE,
            lock_aspect: true,
            margin: 20,
            x_label_area: 90,
            y_label_area: 120,
        }
    }
}
