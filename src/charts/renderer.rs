//! Static Chart Renderer
//! Draws the filtered geolocation points as a scatter plot into an RGB buffer.
//!
//! Layout:
//! 1. Title centred above the panel
//! 2. Panel with filled background, major gridlines and the points
//! 3. Tick labels and bold axis titles on the left and bottom
//!
//! Axis limits are the exact data range, and with `lock_aspect` the panel is
//! shrunk and centred so both axes share one pixels-per-unit scale.
//!
//! Markers are painted after plotters has finished and are clipped to the
//! panel, so points on the data limits never spill onto the tick labels.

use std::ops::Range;

use plotters::prelude::*;
use plotters::style::FontStyle;
use polars::prelude::{Column, DataFrame, DataType, PolarsError};
use thiserror::Error;

use crate::charts::{PlotSpec, Rgb, TextSpec, FONT_FAMILY};
use crate::data::{is_numeric, FilteredDataset, LATITUDE, LONGITUDE};
use crate::error::ErrorKind;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no rows passed the filter, axis limits are undefined")]
    EmptyDataset,
    #[error("column '{0}' is missing or not numeric")]
    MissingColumn(&'static str),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("drawing failed: {0}")]
    Drawing(String),
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::EmptyDataset => ErrorKind::EmptyDataset,
            RenderError::MissingColumn(_) | RenderError::PolarsError(_) => ErrorKind::Schema,
            RenderError::Drawing(_) => ErrorKind::Write,
        }
    }
}

fn drawing<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

/// Rendered plot held in memory as packed 8-bit RGB rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RenderedImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGB value at (x, y), `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 3) as usize;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }
}

/// Axis ranges taken from the data itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLimits {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl AxisLimits {
    /// `[min, max]` of longitude and latitude; a zero-width range is widened
    /// by 5% of its value (or 0.05 at zero) so the axis stays drawable.
    pub fn from_points(points: &[(f64, f64)]) -> Result<Self, RenderError> {
        if points.is_empty() {
            return Err(RenderError::EmptyDataset);
        }

        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);
        for &(px, py) in points {
            x = (x.0.min(px), x.1.max(px));
            y = (y.0.min(py), y.1.max(py));
        }

        Ok(Self {
            x: Self::nonsingular(x),
            y: Self::nonsingular(y),
        })
    }

    pub fn from_frame(df: &DataFrame) -> Result<Self, RenderError> {
        Self::from_points(&StaticChartRenderer::extract_points(df)?)
    }

    fn nonsingular((lo, hi): (f64, f64)) -> (f64, f64) {
        if hi > lo {
            return (lo, hi);
        }
        if lo == 0.0 {
            return (-0.05, 0.05);
        }
        let pad = lo.abs() * 0.05;
        (lo - pad, hi + pad)
    }

    pub fn x_span(&self) -> f64 {
        self.x.1 - self.x.0
    }

    pub fn y_span(&self) -> f64 {
        self.y.1 - self.y.0
    }
}

/// Where plotters placed the panel, and the pixel centre of each marker.
#[derive(Debug, Clone, PartialEq)]
struct PanelGeometry {
    x: Range<i32>,
    y: Range<i32>,
    centres: Vec<(i32, i32)>,
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the scatter plot of `data` according to `spec`.
    ///
    /// Identical input always yields an identical pixel buffer.
    pub fn render(data: &FilteredDataset, spec: &PlotSpec) -> Result<RenderedImage, RenderError> {
        if data.is_empty() {
            return Err(RenderError::EmptyDataset);
        }

        let points = Self::extract_points(data.frame())?;
        let limits = AxisLimits::from_points(&points)?;
        let (width, height) = spec.canvas;

        log::info!(
            "rendering {} points on {}x{} {} canvas, x {:?}, y {:?}",
            points.len(),
            width,
            height,
            spec.theme,
            limits.x,
            limits.y
        );
        if log::log_enabled!(log::Level::Debug) {
            if let Ok(json) = serde_json::to_string(spec) {
                log::debug!("plot spec: {json}");
            }
        }

        let mut pixels = vec![0u8; (width as usize) * (height as usize) * 3];
        let panel = Self::draw(&mut pixels, &points, &limits, spec)?;
        Self::paint_markers(&mut pixels, width, &panel, spec);

        Ok(RenderedImage {
            width,
            height,
            pixels,
        })
    }

    /// Pull (longitude, latitude) pairs out of the frame as f64, skipping nulls.
    pub fn extract_points(df: &DataFrame) -> Result<Vec<(f64, f64)>, RenderError> {
        let numeric = |name: &'static str| -> Result<Column, RenderError> {
            let column = df
                .column(name)
                .map_err(|_| RenderError::MissingColumn(name))?;
            if !is_numeric(column.dtype()) {
                return Err(RenderError::MissingColumn(name));
            }
            Ok(column.cast(&DataType::Float64)?)
        };

        let lon = numeric(LONGITUDE)?;
        let lat = numeric(LATITUDE)?;

        let points = lon
            .f64()?
            .iter()
            .zip(lat.f64()?.iter())
            .filter_map(|(x, y)| Some((x?, y?)))
            .collect();
        Ok(points)
    }

    /// Size (w, h) of the largest box inside `avail` whose sides have the
    /// same ratio as the data spans.
    pub fn aspect_box(avail: (u32, u32), x_span: f64, y_span: f64) -> (u32, u32) {
        let scale = (avail.0 as f64 / x_span).min(avail.1 as f64 / y_span);
        let w = (x_span * scale).round() as u32;
        let h = (y_span * scale).round() as u32;
        (w.clamp(1, avail.0.max(1)), h.clamp(1, avail.1.max(1)))
    }

    fn text_style(font: &TextSpec) -> TextStyle<'static> {
        let desc = (FONT_FAMILY, font.size).into_font();
        let desc = if font.bold {
            desc.style(FontStyle::Bold)
        } else {
            desc
        };
        desc.color(&font.color.to_plotters())
    }

    fn draw(
        buffer: &mut [u8],
        points: &[(f64, f64)],
        limits: &AxisLimits,
        spec: &PlotSpec,
    ) -> Result<PanelGeometry, RenderError> {
        let root = BitMapBackend::with_buffer(buffer, spec.canvas).into_drawing_area();
        root.fill(&spec.background.to_plotters()).map_err(drawing)?;

        let body = root
            .titled(&spec.title, Self::text_style(&spec.title_font))
            .map_err(drawing)?;

        let margin = spec.margin as i32;
        let body = if spec.lock_aspect {
            let (w, h) = body.dim_in_pixel();
            let avail = (
                w.saturating_sub(spec.y_label_area + 2 * spec.margin),
                h.saturating_sub(spec.x_label_area + 2 * spec.margin),
            );
            let (box_w, box_h) = Self::aspect_box(avail, limits.x_span(), limits.y_span());
            let extra_w = avail.0.saturating_sub(box_w) as i32;
            let extra_h = avail.1.saturating_sub(box_h) as i32;
            body.margin(
                margin + extra_h / 2,
                margin + extra_h - extra_h / 2,
                margin + extra_w / 2,
                margin + extra_w - extra_w / 2,
            )
        } else {
            body.margin(margin, margin, margin, margin)
        };

        let mut chart = ChartBuilder::on(&body)
            .x_label_area_size(spec.x_label_area)
            .y_label_area_size(spec.y_label_area)
            .build_cartesian_2d(limits.x.0..limits.x.1, limits.y.0..limits.y.1)
            .map_err(drawing)?;

        chart
            .plotting_area()
            .fill(&spec.panel_background.to_plotters())
            .map_err(drawing)?;

        let tick = spec.tick_font.color.to_plotters();
        chart
            .configure_mesh()
            .x_desc(spec.x_title.as_str())
            .y_desc(spec.y_title.as_str())
            .axis_desc_style(Self::text_style(&spec.axis_title_font))
            .label_style(Self::text_style(&spec.tick_font))
            .bold_line_style(spec.grid_color.to_plotters().stroke_width(1))
            .light_line_style(TRANSPARENT.stroke_width(0))
            .axis_style(tick.stroke_width(1))
            .draw()
            .map_err(drawing)?;

        let (x, y) = chart.plotting_area().get_pixel_range();
        let centres = points.iter().map(|p| chart.backend_coord(p)).collect();

        root.present().map_err(drawing)?;
        Ok(PanelGeometry { x, y, centres })
    }

    /// Alpha-blend a filled disc per marker, clipped to the panel.
    fn paint_markers(pixels: &mut [u8], width: u32, panel: &PanelGeometry, spec: &PlotSpec) {
        let r = spec.point_radius as i32;
        let alpha = spec.point_opacity.clamp(0.0, 1.0);
        let Rgb(red, green, blue) = spec.point_color;
        let x_clip = panel.x.start.max(0)..panel.x.end.min(width as i32);

        for &(cx, cy) in &panel.centres {
            for py in (cy - r).max(panel.y.start.max(0))..(cy + r + 1).min(panel.y.end) {
                for px in (cx - r).max(x_clip.start)..(cx + r + 1).min(x_clip.end) {
                    let (dx, dy) = (px - cx, py - cy);
                    if dx * dx + dy * dy > r * r {
                        continue;
                    }
                    let i = (py as usize * width as usize + px as usize) * 3;
                    let Some(bg) = pixels.get_mut(i..i + 3) else {
                        continue;
                    };
                    for (c, channel) in bg.iter_mut().zip([red, green, blue]) {
                        *c = (f64::from(channel) * alpha + f64::from(*c) * (1.0 - alpha)).round()
                            as u8;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataProcessor, Dataset};
    use polars::prelude::df;
    use pretty_assertions::assert_eq;

    const PANEL: [u8; 3] = [0x3F, 0x3D, 0x70];

    /// Marker green blended over anything: green clearly dominant.
    fn is_marker(p: [u8; 3]) -> bool {
        p[1] > 150 && p[0] < 100 && p[2] < 140
    }

    /// Bounding box (left, top, right, bottom) of the rows and columns made up
    /// mostly of panel colour.
    fn panel_bbox(image: &RenderedImage) -> (u32, u32, u32, u32) {
        let (w, h) = (image.width(), image.height());
        let is_panel = |x: u32, y: u32| image.pixel(x, y) == Some(PANEL);
        let cols: Vec<u32> = (0..w)
            .map(|x| (0..h).filter(|&y| is_panel(x, y)).count() as u32)
            .collect();
        let rows: Vec<u32> = (0..h)
            .map(|y| (0..w).filter(|&x| is_panel(x, y)).count() as u32)
            .collect();
        let span = |counts: &[u32]| {
            let max = counts.iter().copied().max().unwrap();
            let dominant: Vec<u32> = (0..counts.len() as u32)
                .filter(|&i| counts[i as usize] * 2 > max)
                .collect();
            (*dominant.first().unwrap(), *dominant.last().unwrap())
        };
        let (left, right) = span(&cols[..]);
        let (top, bottom) = span(&rows[..]);
        (left, top, right, bottom)
    }

    fn filtered(lon: &[f64], lat: &[f64]) -> FilteredDataset {
        let df = df!("longitude" => lon, "latitude" => lat).unwrap();
        let dataset = Dataset::from_frame(df).unwrap();
        DataProcessor::filter_dataset(&dataset, 40.0).unwrap()
    }

    #[test]
    fn limits_are_exact_data_range() {
        let data = filtered(&[37.5, 20.5, 52.4], &[55.4, 54.7, 71.6]);

        let limits = AxisLimits::from_frame(data.frame()).unwrap();

        assert_eq!(limits.x, (20.5, 52.4));
        assert_eq!(limits.y, (54.7, 71.6));
    }

    #[test]
    fn single_point_limits_are_widened() {
        let close = |a: (f64, f64), b: (f64, f64)| (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9;
        let limits = AxisLimits::from_points(&[(10.0, 45.0)]).unwrap();

        assert!(close(limits.x, (9.5, 10.5)), "{:?}", limits.x);
        assert!(close(limits.y, (42.75, 47.25)), "{:?}", limits.y);

        let limits = AxisLimits::from_points(&[(0.0, 45.0), (0.0, 50.0)]).unwrap();
        assert_eq!(limits.x, (-0.05, 0.05));
        assert!(close(limits.y, (45.0, 50.0)));
    }

    #[test]
    fn empty_points_have_no_limits() {
        let err = AxisLimits::from_points(&[]).unwrap_err();

        assert!(matches!(err, RenderError::EmptyDataset));
    }

    #[test]
    fn aspect_box_keeps_unit_ratio() {
        // 10 units wide, 5 tall inside a square area: width-bound.
        assert_eq!(StaticChartRenderer::aspect_box((1000, 1000), 10.0, 5.0), (1000, 500));
        // 2 units wide, 8 tall: height-bound.
        assert_eq!(StaticChartRenderer::aspect_box((1000, 800), 2.0, 8.0), (200, 800));
    }

    #[test]
    fn empty_filtered_dataset_is_rejected() {
        let data = filtered(&[10.0, 20.0], &[35.0, 12.0]);

        let err = StaticChartRenderer::render(&data, &PlotSpec::default()).unwrap_err();

        assert!(matches!(err, RenderError::EmptyDataset));
        assert_eq!(err.kind(), ErrorKind::EmptyDataset);
    }

    #[test]
    fn missing_longitude_is_reported() {
        let df = df!("latitude" => [45.0]).unwrap();

        let err = StaticChartRenderer::extract_points(&df).unwrap_err();

        assert!(matches!(err, RenderError::MissingColumn(LONGITUDE)));
        assert_eq!(err.kind(), ErrorKind::Schema);
    }

    #[test]
    fn renders_canvas_of_configured_size() {
        let data = filtered(&[10.0, 20.0, 30.0], &[45.0, 50.0, 42.0]);
        let spec = PlotSpec::default();

        let image = StaticChartRenderer::render(&data, &spec).unwrap();

        assert_eq!((image.width(), image.height()), spec.canvas);
        assert_eq!(image.pixels().len(), 1200 * 1200 * 3);
        // Top-left corner sits outside the panel and title.
        assert_eq!(image.pixel(0, 0), Some([255, 255, 255]));
        assert_eq!(image.pixel(1200, 0), None);
    }

    #[test]
    fn rendering_is_deterministic() {
        let data = filtered(&[37.57, 30.30, 43.99], &[55.42, 59.94, 56.33]);
        let spec = PlotSpec::default();

        let first = StaticChartRenderer::render(&data, &spec).unwrap();
        let second = StaticChartRenderer::render(&data, &spec).unwrap();

        assert!(first == second);
    }

    #[test]
    fn panel_keeps_one_to_one_aspect() {
        let data = filtered(&[20.0, 64.0, 42.0], &[54.0, 71.0, 62.5]);

        let image = StaticChartRenderer::render(&data, &PlotSpec::default()).unwrap();
        let (left, top, right, bottom) = panel_bbox(&image);

        let px_per_lon = f64::from(right - left) / 44.0;
        let px_per_lat = f64::from(bottom - top) / 17.0;
        let ratio = px_per_lon / px_per_lat;
        assert!(
            (ratio - 1.0).abs() < 0.01,
            "x {px_per_lon:.3} px/unit, y {px_per_lat:.3} px/unit"
        );
        // Wide data: the panel is height-limited, not the full canvas height.
        assert!(right - left > 2 * (bottom - top));
    }

    #[test]
    fn panel_interior_has_panel_background() {
        let data = filtered(&[20.0, 64.0], &[54.0, 71.0]);

        let image = StaticChartRenderer::render(&data, &PlotSpec::default()).unwrap();
        let (left, top, right, bottom) = panel_bbox(&image);

        let inner = (left + 10..right - 10)
            .flat_map(|x| (top + 10..bottom - 10).map(move |y| (x, y)));
        let (total, panel) = inner.fold((0u32, 0u32), |(t, p), (x, y)| {
            (t + 1, p + u32::from(image.pixel(x, y) == Some(PANEL)))
        });
        assert!(panel * 10 > total * 8, "{panel} of {total} interior pixels are panel colour");
        assert_eq!(image.pixel(0, 0), Some([255, 255, 255]));
    }

    #[test]
    fn marker_is_drawn_at_projected_position() {
        let data = filtered(&[20.0, 64.0, 42.0], &[54.0, 71.0, 62.5]);

        let image = StaticChartRenderer::render(&data, &PlotSpec::default()).unwrap();
        let (left, top, right, bottom) = panel_bbox(&image);

        let x = f64::from(left) + (42.0 - 20.0) / 44.0 * f64::from(right - left);
        let y = f64::from(bottom) - (62.5 - 54.0) / 17.0 * f64::from(bottom - top);
        let (x, y) = (x.round() as i64, y.round() as i64);
        let hit = (-2..=2).any(|dx| {
            (-2..=2).any(|dy| {
                image
                    .pixel((x + dx) as u32, (y + dy) as u32)
                    .is_some_and(is_marker)
            })
        });
        assert!(hit, "no marker colour near ({x}, {y})");
    }

    #[test]
    fn markers_on_the_limits_stay_inside_panel() {
        let data = filtered(&[20.0, 64.0, 20.0, 64.0], &[54.0, 71.0, 71.0, 54.0]);

        let image = StaticChartRenderer::render(&data, &PlotSpec::default()).unwrap();
        let (left, top, right, bottom) = panel_bbox(&image);

        let mut inside = 0;
        let mut outside = 0;
        for y in 0..image.height() {
            for x in 0..image.width() {
                if !image.pixel(x, y).is_some_and(is_marker) {
                    continue;
                }
                if x + 2 < left || x > right + 2 || y + 2 < top || y > bottom + 2 {
                    outside += 1;
                } else {
                    inside += 1;
                }
            }
        }
        assert_eq!(outside, 0);
        assert!(inside > 0);
    }
}
