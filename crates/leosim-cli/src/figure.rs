//! Raster rendering of figure 1: throughput and latency against the
//! prediction horizon, side by side, with the optimal horizon marked.
//!
//! The bitmap is drawn without text so it does not depend on system fonts.
//! Axis labels and titles travel in the JSON series next to it.

use std::ops::Range;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::artifacts::Figure1Series;

pub const FIGURE1_SIZE: (u32, u32) = (1200, 500);

const THROUGHPUT_COLOR: RGBColor = RGBColor(0x2c, 0xa0, 0x2c);
const LATENCY_COLOR: RGBColor = RGBColor(0xff, 0x7f, 0x0e);
const GRID_COLOR: RGBColor = RGBColor(0xe0, 0xe0, 0xe0);
const GRID_DIVISIONS: usize = 5;
const DASHES: usize = 24;

/// Renders the two-panel figure to `path` as a PNG.
pub fn render_figure1_png(path: &Path, figure: &Figure1Series) -> anyhow::Result<()> {
    anyhow::ensure!(
        !figure.horizons_s.is_empty(),
        "figure needs at least one horizon"
    );
    anyhow::ensure!(
        figure.throughput_mbps.len() == figure.horizons_s.len()
            && figure.latency_ms.len() == figure.horizons_s.len(),
        "figure series lengths differ from horizons"
    );

    let root = BitMapBackend::new(path, FIGURE1_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let (left, right) = root.split_horizontally((FIGURE1_SIZE.0 / 2) as i32);

    draw_panel(
        &left,
        &figure.horizons_s,
        &figure.throughput_mbps,
        figure.optimal_horizon_s,
        THROUGHPUT_COLOR,
    )?;
    draw_panel(
        &right,
        &figure.horizons_s,
        &figure.latency_ms,
        figure.optimal_horizon_s,
        LATENCY_COLOR,
    )?;

    root.present()
        .map_err(|e| anyhow::anyhow!("write figure {}: {e}", path.display()))
}

fn draw_err(e: impl std::fmt::Display) -> anyhow::Error {
    anyhow::anyhow!("render figure: {e}")
}

/// Data range widened by a tenth on each side; a single value gets a unit
/// window around it.
fn padded_range(values: impl Iterator<Item = f64> + Clone) -> Range<f64> {
    let lo = values.clone().fold(f64::INFINITY, f64::min);
    let hi = values.fold(f64::NEG_INFINITY, f64::max);
    let pad = if hi > lo { (hi - lo) * 0.1 } else { 1.0 };
    (lo - pad)..(hi + pad)
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    xs: &[f64],
    ys: &[f64],
    optimal_x: f64,
    color: RGBColor,
) -> anyhow::Result<()> {
    let x_range = padded_range(xs.iter().copied().chain([optimal_x]));
    let y_range = padded_range(ys.iter().copied());

    let mut chart = ChartBuilder::on(area)
        .margin(30)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(draw_err)?;

    let grid = (0..=GRID_DIVISIONS).flat_map(|i| {
        let t = i as f64 / GRID_DIVISIONS as f64;
        let x = x_range.start + t * (x_range.end - x_range.start);
        let y = y_range.start + t * (y_range.end - y_range.start);
        [
            PathElement::new(vec![(x, y_range.start), (x, y_range.end)], GRID_COLOR),
            PathElement::new(vec![(x_range.start, y), (x_range.end, y)], GRID_COLOR),
        ]
    });
    chart.draw_series(grid).map_err(draw_err)?;

    let step = (y_range.end - y_range.start) / (2 * DASHES) as f64;
    let dashes = (0..DASHES).map(|i| {
        let y0 = y_range.start + (2 * i) as f64 * step;
        PathElement::new(
            vec![(optimal_x, y0), (optimal_x, y0 + step)],
            RED.stroke_width(2),
        )
    });
    chart.draw_series(dashes).map_err(draw_err)?;

    let points = xs.iter().copied().zip(ys.iter().copied());
    chart
        .draw_series(LineSeries::new(points.clone(), color.stroke_width(3)))
        .map_err(draw_err)?;
    chart
        .draw_series(points.map(|p| Circle::new(p, 6, color.filled())))
        .map_err(draw_err)?;

    area.draw(&Rectangle::new(
        [(0, 0), (FIGURE1_SIZE.0 as i32 / 2 - 1, FIGURE1_SIZE.1 as i32 - 1)],
        BLACK.mix(0.2),
    ))
    .map_err(draw_err)?;
    Ok(())
}
