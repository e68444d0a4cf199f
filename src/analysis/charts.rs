//! SVG charts. Every chart is described by its own [ChartLayout].

use std::fmt::Display;
use std::ops::Range;

use contest_points::comparison::OutlierRow;
use plotters::prelude::*;
use plotters::style::FontTransform;

use crate::analysis::{io_common::ensure_parent_dir, *};

const FONT: &str = "sans-serif";

/// Title, axes and destination of one chart.
#[derive(PartialEq, Debug, Clone)]
pub struct ChartLayout {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Derived from the data when not set.
    pub x_range: Option<Range<f64>>,
    pub y_range: Option<Range<f64>>,
    pub output: PathBuf,
    pub size: (u32, u32),
}

impl ChartLayout {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        output: PathBuf,
    ) -> ChartLayout {
        ChartLayout {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            x_range: None,
            y_range: None,
            output,
            size: (1000, 600),
        }
    }

    pub fn with_ranges(self, x_range: Range<f64>, y_range: Range<f64>) -> ChartLayout {
        ChartLayout {
            x_range: Some(x_range),
            y_range: Some(y_range),
            ..self
        }
    }

    fn draw_error<E: Display>(&self, e: E) -> PollError {
        PollError::Chart {
            path: self.output.display().to_string(),
            message: e.to_string(),
        }
    }

    fn prepare(&self) -> PollResult<()> {
        info!("Drawing chart {:?} to {:?}", self.title, self.output);
        ensure_parent_dir(&self.output)
    }
}

/// Scatter plot of (polling, actual) pairs with the `y = x` line.
pub fn draw_scatter_with_diagonal(layout: &ChartLayout, points: &[(f64, f64)]) -> PollResult<()> {
    layout.prepare()?;
    let x_range = layout.x_range.clone().unwrap_or(0.0..1.0);
    let y_range = layout.y_range.clone().unwrap_or(0.0..1.0);
    let err = |e| layout.draw_error(e);

    let root = SVGBackend::new(&layout.output, layout.size).into_drawing_area();
    root.fill(&WHITE).map_err(err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(layout.title.as_str(), (FONT, 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), y_range)
        .map_err(err)?;
    chart
        .configure_mesh()
        .x_desc(layout.x_label.as_str())
        .y_desc(layout.y_label.as_str())
        .draw()
        .map_err(err)?;

    chart.draw_series(diagonal(&x_range)).map_err(err)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 4, BLUE.filled())),
        )
        .map_err(err)?;
    root.present().map_err(err)?;
    Ok(())
}

/// Scatter plot coloured by z-score, with the outliers labelled.
pub fn draw_outliers(layout: &ChartLayout, rows: &[OutlierRow]) -> PollResult<()> {
    layout.prepare()?;
    let x_range = layout.x_range.clone().unwrap_or(0.0..1.0);
    let y_range = layout.y_range.clone().unwrap_or(0.0..1.0);
    let err = |e| layout.draw_error(e);

    let max_abs = rows
        .iter()
        .map(|r| r.z_score.abs())
        .fold(0.0_f64, f64::max)
        .max(1.0);

    let root = SVGBackend::new(&layout.output, layout.size).into_drawing_area();
    root.fill(&WHITE).map_err(err)?;
    let (main_area, bar_area) = root.split_horizontally(layout.size.0 as i32 - 110);

    let mut chart = ChartBuilder::on(&main_area)
        .caption(layout.title.as_str(), (FONT, 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), y_range)
        .map_err(err)?;
    chart
        .configure_mesh()
        .x_desc(layout.x_label.as_str())
        .y_desc(layout.y_label.as_str())
        .draw()
        .map_err(err)?;
    chart.draw_series(diagonal(&x_range)).map_err(err)?;
    chart
        .draw_series(rows.iter().map(|r| {
            Circle::new(
                (r.polling, r.actual),
                7,
                coolwarm(r.z_score, max_abs).filled(),
            )
        }))
        .map_err(err)?;
    chart
        .draw_series(rows.iter().filter(|r| r.is_outlier).map(|r| {
            Text::new(
                format!("{}: {:.2}", r.name, r.z_score),
                (r.polling, r.actual),
                (FONT, 14).into_font(),
            )
        }))
        .map_err(err)?;

    // Colour bar.
    let mut bar = ChartBuilder::on(&bar_area)
        .margin_top(50)
        .margin_bottom(50)
        .margin_right(10)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0, -max_abs..max_abs)
        .map_err(err)?;
    bar.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(0)
        .y_desc("Z-score")
        .draw()
        .map_err(err)?;
    let steps = 60;
    let step = 2.0 * max_abs / steps as f64;
    bar.draw_series((0..steps).map(|i| {
        let low = -max_abs + i as f64 * step;
        Rectangle::new(
            [(0.0, low), (1.0, low + step)],
            coolwarm(low + step / 2.0, max_abs).filled(),
        )
    }))
    .map_err(err)?;

    root.present().map_err(err)?;
    Ok(())
}

/// One value per year, as a line with markers.
pub fn draw_yearly_line(layout: &ChartLayout, series: &[(u32, f64)]) -> PollResult<()> {
    layout.prepare()?;
    let err = |e| layout.draw_error(e);

    let first = series.iter().map(|(y, _)| *y).min().unwrap_or(0);
    let last = series.iter().map(|(y, _)| *y).max().unwrap_or(0);
    let y_range = layout.y_range.clone().unwrap_or_else(|| {
        let low = series.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
        let high = series
            .iter()
            .map(|(_, v)| *v)
            .fold(f64::NEG_INFINITY, f64::max);
        padded(low, high)
    });

    let root = SVGBackend::new(&layout.output, layout.size).into_drawing_area();
    root.fill(&WHITE).map_err(err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(layout.title.as_str(), (FONT, 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(first.saturating_sub(1)..last + 1, y_range)
        .map_err(err)?;
    chart
        .configure_mesh()
        .x_labels((last - first + 3) as usize)
        .x_desc(layout.x_label.as_str())
        .y_desc(layout.y_label.as_str())
        .draw()
        .map_err(err)?;
    chart
        .draw_series(LineSeries::new(series.iter().cloned(), &BLUE))
        .map_err(err)?;
    chart
        .draw_series(
            series
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 4, BLUE.filled())),
        )
        .map_err(err)?;
    root.present().map_err(err)?;
    Ok(())
}

/// One bar per contestant, in the given order.
pub fn draw_bar_chart(layout: &ChartLayout, bars: &[(String, u64)]) -> PollResult<()> {
    if bars.is_empty() {
        return Err(layout.draw_error("nothing to draw"));
    }
    layout.prepare()?;
    let err = |e| layout.draw_error(e);

    let n = bars.len() as u32;
    let max = bars.iter().map(|(_, v)| *v).max().unwrap_or(0);
    let y_max = layout
        .y_range
        .as_ref()
        .map(|r| r.end.ceil() as u64)
        .unwrap_or(max + max / 10 + 1);
    let label = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(idx) | SegmentValue::Exact(idx) => bars
            .get(*idx as usize)
            .map(|(name, _)| name.clone())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };

    let root = SVGBackend::new(&layout.output, layout.size).into_drawing_area();
    root.fill(&WHITE).map_err(err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(layout.title.as_str(), (FONT, 24))
        .margin(10)
        .x_label_area_size(140)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..n).into_segmented(), 0u64..y_max)
        .map_err(err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len())
        .x_label_formatter(&label)
        .x_label_style(
            (FONT, 12)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .x_desc(layout.x_label.as_str())
        .y_desc(layout.y_label.as_str())
        .draw()
        .map_err(err)?;
    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.filled())
                .margin(3)
                .data(bars.iter().enumerate().map(|(idx, (_, v))| (idx as u32, *v))),
        )
        .map_err(err)?;
    root.present().map_err(err)?;
    Ok(())
}

/// Distribution of point values (0 to 12).
pub fn draw_histogram(layout: &ChartLayout, values: &[u32]) -> PollResult<()> {
    layout.prepare()?;
    let err = |e| layout.draw_error(e);

    let top = contest_points::POINTS_SCALE[0] + 1;
    let mut frequencies = vec![0u32; top as usize];
    for v in values {
        if let Some(f) = frequencies.get_mut(*v as usize) {
            *f += 1;
        }
    }
    let y_max = frequencies.iter().cloned().max().unwrap_or(0) + 1;

    let root = SVGBackend::new(&layout.output, layout.size).into_drawing_area();
    root.fill(&WHITE).map_err(err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(layout.title.as_str(), (FONT, 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..top).into_segmented(), 0u32..y_max)
        .map_err(err)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(layout.x_label.as_str())
        .y_desc(layout.y_label.as_str())
        .draw()
        .map_err(err)?;
    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.filled())
                .margin(3)
                .data(values.iter().map(|v| (*v, 1u32))),
        )
        .map_err(err)?;
    root.present().map_err(err)?;
    Ok(())
}

fn diagonal<DB: DrawingBackend>(x_range: &Range<f64>) -> LineSeries<DB, (f64, f64)> {
    LineSeries::new(
        vec![(x_range.start, x_range.start), (x_range.end, x_range.end)],
        BLACK.stroke_width(1),
    )
}

fn padded(low: f64, high: f64) -> Range<f64> {
    if !low.is_finite() || !high.is_finite() {
        return 0.0..1.0;
    }
    let pad = ((high - low) * 0.1).max(0.05);
    (low - pad)..(high + pad)
}

// Blue for negative scores, red for positive ones, grey around zero.
fn coolwarm(z: f64, max_abs: f64) -> RGBColor {
    const COOL: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const NEUTRAL: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let t = (z / max_abs).clamp(-1.0, 1.0);
    let (from, to, w) = if t < 0.0 {
        (NEUTRAL, COOL, -t)
    } else {
        (NEUTRAL, WARM, t)
    };
    let mix = |a: f64, b: f64| (a + (b - a) * w).round() as u8;
    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}
