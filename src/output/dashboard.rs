use std::path::Path;

use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontStyle, FontTransform};

use crate::data::model::{Column, Table};
use crate::data::stats;

/// Fixed dashboard filename, relative to the working directory.
pub const DASHBOARD_FILE: &str = "analysis_dashboard.png";

// 14in x 10in figure at 300 dpi.
const WIDTH: u32 = 4200;
const HEIGHT: u32 = 3000;

const HIST_BINS: usize = 30;
const TOP_BAR_VALUES: usize = 10;

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const CORAL: RGBColor = RGBColor(255, 127, 80);

type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

// ---------------------------------------------------------------------------
// Dashboard entry-point
// ---------------------------------------------------------------------------

/// Render the 2×2 chart grid to `path`, overwriting any previous image.
///
/// Panels, in reading order: histogram of the first numeric column, bar chart
/// of the first text column, correlation heatmap, scatter of the first two
/// numeric columns. A panel whose data precondition fails stays blank; the
/// image is written regardless.
pub fn render_dashboard(table: &Table, source_name: &str, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        &format!("Data Analysis Dashboard: {source_name}"),
        ("sans-serif", 70).into_font().style(FontStyle::Bold),
    )?;
    let panels = root.split_evenly((2, 2));

    let numeric = table.numeric_columns();
    let categorical = table.categorical_columns();

    if let Some(col) = numeric.first() {
        draw_histogram(&panels[0], col)?;
    }
    if let Some(col) = categorical.first() {
        draw_bar_chart(&panels[1], col)?;
    }
    if numeric.len() >= 2 {
        draw_heatmap(&panels[2], table)?;
        draw_scatter(&panels[3], numeric[0], numeric[1])?;
    }

    root.present()
        .with_context(|| format!("saving dashboard to {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Panel 1: histogram
// ---------------------------------------------------------------------------

fn draw_histogram(panel: &Panel<'_>, column: &Column) -> Result<()> {
    let mut values = column.numeric_values();
    values.retain(|v| v.is_finite());
    if values.is_empty() {
        return Ok(());
    }

    let (min, bin_width, counts) = bin_counts(&values, HIST_BINS);
    let max_count = counts.iter().max().copied().unwrap_or(0).max(1) as u32;
    let x_max = min + bin_width * HIST_BINS as f64;

    let mut chart = ChartBuilder::on(panel)
        .caption(format!("Distribution of {}", column.name), ("sans-serif", 50))
        .margin(30)
        .x_label_area_size(100)
        .y_label_area_size(120)
        .build_cartesian_2d(min..x_max, 0u32..max_count + max_count / 10 + 1)?;

    chart
        .configure_mesh()
        .x_desc(&column.name)
        .y_desc("Frequency")
        .label_style(("sans-serif", 30))
        .axis_desc_style(("sans-serif", 36))
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(i, &c)| {
        let x0 = min + i as f64 * bin_width;
        Rectangle::new([(x0, 0), (x0 + bin_width, c as u32)], SKY_BLUE.filled())
    }))?;
    // Bar outlines on top of the fill.
    chart.draw_series(counts.iter().enumerate().map(|(i, &c)| {
        let x0 = min + i as f64 * bin_width;
        Rectangle::new([(x0, 0), (x0 + bin_width, c as u32)], BLACK)
    }))?;
    Ok(())
}

/// Equal-width bins over `[min, max]`; the top edge lands in the last bin.
fn bin_counts(values: &[f64], bins: usize) -> (f64, f64, Vec<usize>) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = if max > min { max - min } else { 1.0 };
    let bin_width = span / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / bin_width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    (min, bin_width, counts)
}

// ---------------------------------------------------------------------------
// Panel 2: bar chart of top categories
// ---------------------------------------------------------------------------

fn draw_bar_chart(panel: &Panel<'_>, column: &Column) -> Result<()> {
    let counts: Vec<(String, usize)> = stats::value_counts(column)
        .into_iter()
        .take(TOP_BAR_VALUES)
        .collect();
    if counts.is_empty() {
        return Ok(());
    }

    let labels: Vec<String> = counts.iter().map(|(v, _)| v.clone()).collect();
    let max_count = counts.iter().map(|(_, c)| *c).max().unwrap_or(1) as u32;
    let n = counts.len() as i32;

    let mut chart = ChartBuilder::on(panel)
        .caption(format!("Top Values in {}", column.name), ("sans-serif", 50))
        .margin(30)
        .x_label_area_size(220)
        .y_label_area_size(120)
        .build_cartesian_2d((0..n).into_segmented(), 0u32..max_count + max_count / 10 + 1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Count")
        .label_style(("sans-serif", 30))
        .axis_desc_style(("sans-serif", 36))
        .x_labels(counts.len())
        .x_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(i) => {
                labels.get(*i as usize).cloned().unwrap_or_default()
            }
            _ => String::new(),
        })
        // Long category labels go vertical so they stay readable.
        .x_label_style(
            ("sans-serif", 30)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(i, (_, c))| {
        Rectangle::new(
            [
                (SegmentValue::Exact(i as i32), 0),
                (SegmentValue::Exact(i as i32 + 1), *c as u32),
            ],
            CORAL.filled(),
        )
    }))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Panel 3: correlation heatmap
// ---------------------------------------------------------------------------

fn draw_heatmap(panel: &Panel<'_>, table: &Table) -> Result<()> {
    let Some((names, matrix)) = stats::correlation_matrix(table) else {
        return Ok(());
    };
    let n = names.len() as i32;

    let mut chart = ChartBuilder::on(panel)
        .caption("Correlation Heatmap", ("sans-serif", 50))
        .margin(30)
        .x_label_area_size(100)
        .y_label_area_size(180)
        .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())?;

    let x_names = names.clone();
    let y_names = names.clone();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .label_style(("sans-serif", 30))
        .x_labels(names.len())
        .y_labels(names.len())
        .x_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(i) => x_names.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .y_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(i) => y_names.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    for (i, row) in matrix.iter().enumerate() {
        for (j, &r) in row.iter().enumerate() {
            chart.draw_series(std::iter::once(Rectangle::new(
                [
                    (SegmentValue::Exact(i as i32), SegmentValue::Exact(j as i32)),
                    (
                        SegmentValue::Exact(i as i32 + 1),
                        SegmentValue::Exact(j as i32 + 1),
                    ),
                ],
                correlation_color(r).filled(),
            )))?;

            let text_color = if r.is_finite() && r.abs() > 0.6 {
                WHITE
            } else {
                BLACK
            };
            let style = ("sans-serif", 32)
                .into_font()
                .color(&text_color)
                .pos(Pos::new(HPos::Center, VPos::Center));
            chart.plotting_area().draw(&Text::new(
                format!("{r:.2}"),
                (
                    SegmentValue::CenterOf(i as i32),
                    SegmentValue::CenterOf(j as i32),
                ),
                style,
            ))?;
        }
    }
    Ok(())
}

/// Blue for negative, red for positive, fading to near-white at zero.
fn correlation_color(r: f64) -> RGBColor {
    const BLUE: (u8, u8, u8) = (59, 76, 192);
    const MID: (u8, u8, u8) = (221, 221, 221);
    const RED: (u8, u8, u8) = (180, 4, 38);

    if r.is_nan() {
        return RGBColor(245, 245, 245);
    }
    let t = r.clamp(-1.0, 1.0);
    if t < 0.0 {
        blend(MID, BLUE, -t)
    } else {
        blend(MID, RED, t)
    }
}

fn blend(from: (u8, u8, u8), to: (u8, u8, u8), t: f64) -> RGBColor {
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(
        channel(from.0, to.0),
        channel(from.1, to.1),
        channel(from.2, to.2),
    )
}

// ---------------------------------------------------------------------------
// Panel 4: scatter
// ---------------------------------------------------------------------------

fn draw_scatter(panel: &Panel<'_>, x_col: &Column, y_col: &Column) -> Result<()> {
    let points: Vec<(f64, f64)> = x_col
        .values
        .iter()
        .zip(&y_col.values)
        .filter_map(|(a, b)| Some((a.as_f64()?, b.as_f64()?)))
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .collect();
    if points.is_empty() {
        return Ok(());
    }

    let xs = padded_range(points.iter().map(|(a, _)| *a));
    let ys = padded_range(points.iter().map(|(_, b)| *b));

    let mut chart = ChartBuilder::on(panel)
        .caption(
            format!("{} vs {}", x_col.name, y_col.name),
            ("sans-serif", 50),
        )
        .margin(30)
        .x_label_area_size(100)
        .y_label_area_size(120)
        .build_cartesian_2d(xs, ys)?;

    chart
        .configure_mesh()
        .x_desc(&x_col.name)
        .y_desc(&y_col.name)
        .label_style(("sans-serif", 30))
        .axis_desc_style(("sans-serif", 36))
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&(x, y)| Circle::new((x, y), 12, GREEN.mix(0.5).filled())),
    )?;
    Ok(())
}

fn padded_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    let span = max - min;
    if span == 0.0 {
        min - 1.0..max + 1.0
    } else {
        min - span * 0.05..max + span * 0.05
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
