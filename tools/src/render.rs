//! Dataset overview figure.
//!
//! Four panels on one bitmap:
//!   (a.1) C&I active power, (a.2) residential active power,
//!   (b)   Q density of C&I customers, (c) missing-Q share per persona.

use anyhow::{anyhow, Result};
use loadgen_core::overview::{DatasetOverview, PersonaSeries};
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use std::{error::Error, path::Path};

pub const OVERVIEW_FILE: &str = "dataset_overview.png";

const FIGURE_SIZE: (u32, u32) = (1700, 1400);
const TOP_ROW_SHARE: f64 = 1.2 / 2.2;

const ORANGE: RGBColor = RGBColor(255, 165, 0);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const DARK_GREEN: RGBColor = RGBColor(0, 128, 0);
const DARK_CYAN: RGBColor = RGBColor(0, 139, 139);
const GRAY: RGBColor = RGBColor(128, 128, 128);
const VIRIDIS: [RGBColor; 5] = [
    RGBColor(68, 1, 84),
    RGBColor(59, 82, 139),
    RGBColor(33, 145, 140),
    RGBColor(94, 201, 98),
    RGBColor(253, 231, 37),
];

type DrawResult<T> = std::result::Result<T, Box<dyn Error>>;

/// `Dataset Overview: <directory name>`.
pub fn title_for(dataset_dir: &Path) -> String {
    let name = dataset_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dataset_dir.display().to_string());
    format!("Dataset Overview: {name}")
}

pub fn render_overview(overview: &DatasetOverview, title: &str, out_path: &Path) -> Result<()> {
    draw(overview, title, out_path)
        .map_err(|e| anyhow!("failed to render {}: {e}", out_path.display()))?;
    log::info!("overview written to {}", out_path.display());
    Ok(())
}

fn draw(overview: &DatasetOverview, title: &str, out_path: &Path) -> DrawResult<()> {
    let root = BitMapBackend::new(out_path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(title, ("sans-serif", 32).into_font().style(FontStyle::Bold))?;

    let (width, height) = body.dim_in_pixel();
    let half_width = (width / 2) as i32;
    let (top, bottom) = body.split_vertically((height as f64 * TOP_ROW_SHARE) as i32);
    let (top_left, top_right) = top.split_horizontally(half_width);
    let (bottom_left, bottom_right) = bottom.split_horizontally(half_width);

    let time_axis = overview.time_axis();
    draw_profiles(
        &top_left,
        "(a.1) C&I Active Power (P) Profiles",
        &overview.commercial,
        &time_axis,
        false,
    )?;
    draw_profiles(
        &top_right,
        "(a.2) Residential Active Power (P) Profiles",
        &overview.residential,
        &time_axis,
        true,
    )?;
    draw_q_density(&bottom_left, overview.q_density.as_deref())?;
    draw_missing_q(&bottom_right, &overview.missing_q)?;

    root.present()?;
    Ok(())
}

fn persona_style(persona_id: &str) -> (RGBColor, &'static str) {
    match persona_id {
        "P1" => (BLUE, "P1: FDI Compliant (Mean)"),
        "P2" => (RED, "P2: Industrial Violator (Mean)"),
        "P3" => (ORANGE, "P3: Commercial (Mean)"),
        "P4" => (PURPLE, "P4: Residential Peak (Mean)"),
        "P5" => (DARK_GREEN, "P5: Residential w/ Solar (Mean)"),
        _ => (GRAY, "Other (Mean)"),
    }
}

/// Split a series with gaps into contiguous runs of defined points.
fn defined_runs(xs: &[f64], ys: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (&x, y) in xs.iter().zip(ys) {
        match y {
            Some(y) => current.push((x, *y)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn value_range<'a>(series: impl Iterator<Item = &'a Option<f64>>) -> (f64, f64) {
    let (lo, hi) = series
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(0.1);
    (lo - pad, hi + pad)
}

fn draw_profiles<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    caption: &str,
    personas: &[PersonaSeries],
    time_axis: &[f64],
    zero_line: bool,
) -> DrawResult<()>
where
    DB::ErrorType: 'static,
{
    let (y_lo, y_hi) = value_range(
        personas
            .iter()
            .flat_map(|s| s.mean.iter().chain(s.samples.iter().flatten())),
    );

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 20).into_font().style(FontStyle::Bold))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0f64..24.0, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.15))
        .x_labels(5)
        .x_label_formatter(&|x| format!("{x:.0}"))
        .x_desc("Hour of day")
        .y_desc("Power (kW)")
        .draw()?;

    if zero_line {
        chart.draw_series((0..48).step_by(2).map(|k| {
            let x0 = k as f64 * 0.5;
            PathElement::new(vec![(x0, 0.0), (x0 + 0.5, 0.0)], BLACK.stroke_width(1))
        }))?;
    }

    for series in personas {
        let (color, label) = persona_style(&series.persona_id);
        for sample in &series.samples {
            for run in defined_runs(time_axis, sample) {
                chart.draw_series(LineSeries::new(run, color.mix(0.2).stroke_width(1)))?;
            }
        }
        for (i, run) in defined_runs(time_axis, &series.mean).into_iter().enumerate() {
            let drawn = chart.draw_series(LineSeries::new(run, color.stroke_width(3)))?;
            if i == 0 {
                drawn.label(label).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3))
                });
            }
        }
    }

    if !personas.is_empty() {
        chart
            .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())?
            .label("Individual Samples")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GRAY.mix(0.5)));
        chart
            .configure_series_labels()
            .label_font(("sans-serif", 13))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

fn draw_q_density<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    curve: Option<&[(f64, f64)]>,
) -> DrawResult<()>
where
    DB::ErrorType: 'static,
{
    let curve = curve.unwrap_or(&[]);
    let (x_lo, x_hi) = match (curve.first(), curve.last()) {
        (Some(first), Some(last)) => (first.0, last.0),
        _ => (0.0, 1.0),
    };
    let y_hi = curve.iter().map(|p| p.1).fold(0.0, f64::max).max(1e-6) * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption(
            "(b) Q Distribution (C&I Customers)",
            ("sans-serif", 20).into_font().style(FontStyle::Bold),
        )
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_lo..x_hi, 0.0..y_hi)?;

    chart
        .configure_mesh()
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.15))
        .x_desc("Reactive Power (kVAr)")
        .y_desc("Density")
        .y_label_formatter(&|y| format!("{y:.4}"))
        .draw()?;

    if !curve.is_empty() {
        chart.draw_series(
            AreaSeries::new(curve.iter().copied(), 0.0, DARK_CYAN.mix(0.6))
                .border_style(DARK_CYAN.stroke_width(2)),
        )?;
    }
    Ok(())
}

fn draw_missing_q<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    missing: &[(String, f64)],
) -> DrawResult<()>
where
    DB::ErrorType: 'static,
{
    let n = missing.len().max(1) as i32;
    let mut chart = ChartBuilder::on(area)
        .caption(
            "(c) Missing Q Data Percentage",
            ("sans-serif", 20).into_font().style(FontStyle::Bold),
        )
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), 0.0f64..105.0)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.15))
        .y_labels(5)
        .x_desc("Customer Persona ID")
        .y_desc("% Missing")
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => missing
                .get(*i as usize)
                .map(|(id, _)| id.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    for (i, (_, pct)) in missing.iter().enumerate() {
        let i = i as i32;
        let color = VIRIDIS[i as usize % VIRIDIS.len()];
        chart.draw_series(std::iter::once(Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *pct)],
            color.filled(),
        )))?;
        let annotation = if *pct == 0.0 {
            Some(("0%", 2.0, BLACK))
        } else if *pct == 100.0 {
            Some(("100%", 95.0, WHITE))
        } else {
            None
        };
        if let Some((text, y, text_color)) = annotation {
            chart.draw_series(std::iter::once(Text::new(
                text,
                (SegmentValue::CenterOf(i), y),
                ("sans-serif", 14).into_font().color(&text_color),
            )))?;
        }
    }
    Ok(())
}
