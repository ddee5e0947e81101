// Line chart drawing
use crate::domain::dashboard::{ChartData, SeriesData};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use plotters_backend::text_anchor::{HPos, Pos, VPos};

const WIDTH: u32 = 960;
const HEIGHT: u32 = 400;
/// Height of the plot; the strip below it holds the legend row
const PLOT_HEIGHT: i32 = 352;
const Y_TICKS: usize = 5;
const MAX_X_LABELS: usize = 12;
const LEGEND_SWATCH: i32 = 16;
const LEGEND_PAD: i32 = 6;
const LEGEND_GAP: i32 = 20;
const FALLBACK_COLOR: RGBColor = RGBColor(128, 128, 128);

fn font(size: f64) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
}

/// At most two decimals, trailing zeros trimmed
pub fn format_value(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}

/// CSS color name or `#rrggbb`
pub fn parse_color(name: &str) -> Option<RGBColor> {
    let name = name.trim().to_ascii_lowercase();
    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(RGBColor(channel(0)?, channel(2)?, channel(4)?));
    }

    let (r, g, b) = match name.as_str() {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "gray" | "grey" => (128, 128, 128),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "teal" => (0, 128, 128),
        "royalblue" => (65, 105, 225),
        "steelblue" => (70, 130, 180),
        "seagreen" => (46, 139, 87),
        "indianred" => (205, 92, 92),
        "crimson" => (220, 20, 60),
        "darkorange" => (255, 140, 0),
        "goldenrod" => (218, 165, 32),
        "slategray" | "slategrey" => (112, 128, 144),
        _ => return None,
    };
    Some(RGBColor(r, g, b))
}

fn series_color(series: &SeriesData) -> RGBColor {
    parse_color(&series.color).unwrap_or(FALLBACK_COLOR)
}

fn legend_label(series: &SeriesData) -> &str {
    if series.category.is_empty() { "(uncategorized)" } else { &series.category }
}

/// Label for a tick on the categorical x axis; off-category ticks stay blank
fn category_label(labels: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

/// Padded y range; a flat series gets one unit either side
fn y_range(chart: &ChartData) -> (f64, f64) {
    let (lo, hi) = chart.value_bounds().unwrap_or((0.0, 1.0));
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.08;
    (lo - pad, hi + pad)
}

/// Left edge of each legend item for a row centered in `area_width`
pub fn legend_layout(label_widths: &[u32], area_width: u32) -> Vec<i32> {
    let items: Vec<i32> = label_widths
        .iter()
        .map(|w| LEGEND_SWATCH + LEGEND_PAD + *w as i32)
        .collect();
    let total = items.iter().sum::<i32>() + LEGEND_GAP * items.len().saturating_sub(1) as i32;

    let mut x = (area_width as i32 - total) / 2;
    items
        .iter()
        .map(|w| {
            let left = x;
            x += w + LEGEND_GAP;
            left
        })
        .collect()
}

pub fn render_chart_svg(chart: &ChartData) -> anyhow::Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        draw_chart(&root, chart)?;
        root.present()?;
    }
    Ok(svg)
}

fn draw_chart<DB>(root: &DrawingArea<DB, Shift>, chart: &ChartData) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let (plot_area, legend_area) = root.split_vertically(PLOT_HEIGHT);

    let count = chart.x_labels.len().max(1);
    let (y_lo, y_hi) = y_range(chart);

    let mut plot = ChartBuilder::on(&plot_area)
        .margin(12)
        .set_label_area_size(LabelAreaPosition::Left, 56)
        .set_label_area_size(LabelAreaPosition::Bottom, 32)
        .build_cartesian_2d(-0.5..count as f64 - 0.5, y_lo..y_hi)?;

    let x_label = |x: &f64| category_label(&chart.x_labels, *x);
    let y_label = |y: &f64| format_value(*y);
    plot.configure_mesh()
        .disable_x_mesh()
        .x_labels(count.min(MAX_X_LABELS))
        .y_labels(Y_TICKS)
        .x_label_formatter(&x_label)
        .y_label_formatter(&y_label)
        .label_style(font(11.0))
        .draw()?;

    for series in &chart.series {
        let color = series_color(series);
        let points: Vec<(f64, f64)> = series.points.iter().map(|(i, v)| (*i as f64, *v)).collect();

        plot.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?;

        // A lone point has no segment, so it is drawn as a dot
        if chart.show_markers || points.len() == 1 {
            plot.draw_series(points.iter().map(|p| Circle::new(*p, 4, color.filled())))?;
        }

        if chart.show_markers {
            let style = font(10.0).color(&color).pos(Pos::new(HPos::Center, VPos::Bottom));
            plot.draw_series(points.iter().map(|(x, y)| {
                EmptyElement::at((*x, *y)) + Text::new(format_value(*y), (0, -6), style.clone())
            }))?;
        }
    }

    draw_legend(&legend_area, chart)
}

fn draw_legend<DB>(area: &DrawingArea<DB, Shift>, chart: &ChartData) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let style = font(12.0).color(&BLACK).pos(Pos::new(HPos::Left, VPos::Center));

    let mut widths = Vec::with_capacity(chart.series.len());
    for series in &chart.series {
        widths.push(area.estimate_text_size(legend_label(series), &style)?.0);
    }

    let (width, height) = area.dim_in_pixel();
    let y = height as i32 / 2;
    for (series, left) in chart.series.iter().zip(legend_layout(&widths, width)) {
        let color = series_color(series);
        area.draw(&Rectangle::new(
            [(left, y - 2), (left + LEGEND_SWATCH, y + 2)],
            color.filled(),
        ))?;
        area.draw(&Text::new(
            legend_label(series),
            (left + LEGEND_SWATCH + LEGEND_PAD, y),
            style.clone(),
        ))?;
    }
    Ok(())
}
