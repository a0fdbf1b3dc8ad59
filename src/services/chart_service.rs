//! Four-panel Heikin-Ashi signal chart rendered with plotters

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use tracing::{debug, info};

use crate::config::ChartConfig;
use crate::models::SignalDataset;
use crate::utils::ChartError;

const BACKGROUND: RGBColor = RGBColor(0x1a, 0x1a, 0x2e);
const GRID: RGBColor = RGBColor(0x2a, 0x2a, 0x4a);
const AXIS: RGBColor = RGBColor(0x3a, 0x3a, 0x5a);
const UP: RGBColor = RGBColor(0x26, 0xa6, 0x9a);
const DOWN: RGBColor = RGBColor(0xef, 0x53, 0x50);
const SMA_COLOR: RGBColor = RGBColor(0x42, 0xa5, 0xf5);
const EMA_COLOR: RGBColor = RGBColor(0xff, 0xd5, 0x4f);
const RSI_COLOR: RGBColor = RGBColor(0xab, 0x47, 0xbc);
const RSI_UPPER_COLOR: RGBColor = RGBColor(0xff, 0x52, 0x52);
const RSI_LOWER_COLOR: RGBColor = RGBColor(0x4c, 0xaf, 0x50);
const MACD_COLOR: RGBColor = RGBColor(0x42, 0xa5, 0xf5);
const SIGNAL_COLOR: RGBColor = RGBColor(0xff, 0x70, 0x43);

/// Price, volume, RSI, MACD
const PANEL_RATIOS: [f64; 4] = [4.0, 1.0, 1.5, 1.5];
const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_OVERSOLD: f64 = 30.0;
const BAR_HALF_WIDTH: f64 = 0.35;

type Panel<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn render_err<E: std::fmt::Display>(what: &'static str) -> impl FnOnce(E) -> ChartError {
    move |e| ChartError::Render(format!("Failed to {}: {}", what, e))
}

fn label_font() -> TextStyle<'static> {
    ("sans-serif", 12).into_font().color(&WHITE)
}

/// `{symbol}_{interval}_{YYYYmmdd_HHMMSS}.png`
pub fn chart_file_name(symbol: &str, interval: &str, now: DateTime<FixedOffset>) -> String {
    format!("{}_{}_{}.png", symbol, interval, now.format("%Y%m%d_%H%M%S"))
}

/// Split `total` pixels between the panels by `PANEL_RATIOS`; the last panel takes the rounding slack
fn panel_heights(total: u32) -> [u32; 4] {
    let sum: f64 = PANEL_RATIOS.iter().sum();
    let mut heights = [0u32; 4];
    let mut used = 0;
    for (height, ratio) in heights.iter_mut().zip(PANEL_RATIOS.iter()).take(3) {
        *height = (total as f64 * ratio / sum).round() as u32;
        used += *height;
    }
    heights[3] = total.saturating_sub(used);
    heights
}

/// Min/max of the values with 5% padding on each side, `None` if there are no values
fn padded_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    let span = max - min;
    let padding = if span > 0.0 { span * 0.05 } else { max.abs().max(1.0) * 0.05 };
    Some((min - padding, max + padding))
}

/// Every other segment of the polyline, for dashed lines
fn dashes(
    points: &[(f64, f64)],
    style: ShapeStyle,
) -> impl Iterator<Item = PathElement<(f64, f64)>> + '_ {
    points
        .windows(2)
        .step_by(2)
        .map(move |w| PathElement::new(vec![w[0], w[1]], style))
}

fn draw_mesh(
    chart: &mut Panel<'_, '_>,
    y_desc: &str,
    y_labels: usize,
    x_formatter: Option<&dyn Fn(&f64) -> String>,
) -> Result<(), ChartError> {
    let mut mesh = chart.configure_mesh();
    mesh.bold_line_style(GRID.stroke_width(1))
        .light_line_style(GRID.mix(0.3).stroke_width(1))
        .axis_style(AXIS.stroke_width(1))
        .label_style(label_font())
        .axis_desc_style(label_font())
        .y_desc(y_desc)
        .y_labels(y_labels);

    match x_formatter {
        Some(formatter) => {
            mesh.x_labels(8).x_label_formatter(formatter);
        }
        None => {
            mesh.x_labels(0);
        }
    }

    mesh.draw().map_err(render_err("draw mesh"))
}

fn draw_legend<'a, 'b: 'a>(chart: &mut Panel<'a, 'b>) -> Result<(), ChartError> {
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(BACKGROUND.mix(0.8).filled())
        .border_style(AXIS.stroke_width(1))
        .label_font(label_font())
        .draw()
        .map_err(render_err("draw legend"))
}

/// Render the dataset to a PNG in `config.output_dir` and return its path
pub fn render_signal_chart(
    dataset: &SignalDataset,
    symbol: &str,
    interval: &str,
    config: &ChartConfig,
) -> Result<PathBuf, ChartError> {
    if dataset.is_empty() {
        return Err(ChartError::insufficient(1, 0));
    }

    std::fs::create_dir_all(&config.output_dir)?;
    let now = Utc::now().with_timezone(&config.timezone);
    let out_path = config.output_dir.join(chart_file_name(symbol, interval, now));
    let title = format!(
        "{} {} (Heikin-Ashi) - {}",
        symbol, interval, config.timezone_label
    );

    debug!("Rendering {} candles to {}", dataset.len(), out_path.display());
    draw_chart(dataset, &title, &out_path, config)?;

    let out_path = std::fs::canonicalize(&out_path).unwrap_or(out_path);
    info!("Chart written to {}", out_path.display());
    Ok(out_path)
}

fn draw_chart(
    dataset: &SignalDataset,
    title: &str,
    path: &Path,
    config: &ChartConfig,
) -> Result<(), ChartError> {
    let n = dataset.len();
    let x_range = -0.5..(n as f64 - 0.5);
    let time_labels: Vec<String> = dataset
        .timestamps()
        .map(|t| t.with_timezone(&config.timezone).format("%m-%d %H:%M").to_string())
        .collect();
    let x_formatter = |x: &f64| -> String {
        let idx = x.round();
        if idx < 0.0 {
            return String::new();
        }
        time_labels.get(idx as usize).cloned().unwrap_or_default()
    };

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    root.fill(&BACKGROUND).map_err(render_err("fill canvas"))?;
    let root = root
        .titled(title, ("sans-serif", 20).into_font().color(&WHITE))
        .map_err(render_err("draw title"))?;

    let (plot_width, plot_height) = root.dim_in_pixel();
    let [price_h, volume_h, rsi_h, _] = panel_heights(plot_height);
    let (price_area, rest) = root.split_vertically(price_h);
    let (volume_area, rest) = rest.split_vertically(volume_h);
    let (rsi_area, macd_area) = rest.split_vertically(rsi_h);

    let candle_px = ((plot_width as f64 / n as f64) * 0.6).max(1.0) as u32;

    // Price: Heikin-Ashi candles with SMA20 and EMA200
    {
        let price_values = dataset
            .ha_candles
            .iter()
            .flat_map(|c| [c.high, c.low])
            .chain(dataset.sma20.defined().map(|(_, v)| v))
            .chain(dataset.ema200.defined().map(|(_, v)| v));
        let (y_min, y_max) = padded_range(price_values)
            .ok_or_else(|| ChartError::Render("no price values to plot".to_string()))?;

        let mut chart = ChartBuilder::on(&price_area)
            .margin(8)
            .x_label_area_size(0)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range.clone(), y_min..y_max)
            .map_err(render_err("build price panel"))?;
        draw_mesh(&mut chart, "Price", 8, None)?;

        chart
            .draw_series(dataset.ha_candles.iter().enumerate().map(|(i, c)| {
                CandleStick::new(
                    i as f64,
                    c.open,
                    c.high,
                    c.low,
                    c.close,
                    UP.filled(),
                    DOWN.filled(),
                    candle_px,
                )
            }))
            .map_err(render_err("draw candles"))?;

        let sma_style = SMA_COLOR.stroke_width(2);
        chart
            .draw_series(LineSeries::new(
                dataset.sma20.defined().map(|(i, v)| (i as f64, v)),
                sma_style,
            ))
            .map_err(render_err("draw SMA20"))?
            .label("SMA20")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], sma_style));

        let ema_style = EMA_COLOR.stroke_width(2);
        let ema_points: Vec<(f64, f64)> =
            dataset.ema200.defined().map(|(i, v)| (i as f64, v)).collect();
        chart
            .draw_series(dashes(&ema_points, ema_style))
            .map_err(render_err("draw EMA200"))?
            .label("EMA200")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], ema_style));

        draw_legend(&mut chart)?;
    }

    // Volume
    {
        let max_volume = dataset.ha_candles.iter().map(|c| c.volume).fold(0.0, f64::max);
        let mut chart = ChartBuilder::on(&volume_area)
            .margin(8)
            .x_label_area_size(0)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range.clone(), 0.0..max_volume.max(1e-8) * 1.1)
            .map_err(render_err("build volume panel"))?;
        draw_mesh(&mut chart, "Volume", 3, None)?;

        chart
            .draw_series(dataset.ha_candles.iter().enumerate().map(|(i, c)| {
                let color = if c.is_bullish() { UP } else { DOWN };
                let x = i as f64;
                Rectangle::new(
                    [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, c.volume)],
                    color.filled(),
                )
            }))
            .map_err(render_err("draw volume"))?;
    }

    // RSI with 70/30 guides
    {
        let mut chart = ChartBuilder::on(&rsi_area)
            .margin(8)
            .x_label_area_size(0)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range.clone(), 0.0..100.0)
            .map_err(render_err("build RSI panel"))?;
        draw_mesh(&mut chart, "RSI", 5, None)?;

        for (level, color) in [(RSI_OVERBOUGHT, RSI_UPPER_COLOR), (RSI_OVERSOLD, RSI_LOWER_COLOR)] {
            let guide: Vec<(f64, f64)> = (0..n).map(|i| (i as f64, level)).collect();
            chart
                .draw_series(dashes(&guide, color.stroke_width(1)))
                .map_err(render_err("draw RSI guide"))?;
        }

        chart
            .draw_series(LineSeries::new(
                dataset.rsi14.defined().map(|(i, v)| (i as f64, v)),
                RSI_COLOR.stroke_width(2),
            ))
            .map_err(render_err("draw RSI"))?;
    }

    // MACD histogram, line and signal
    {
        let macd = &dataset.macd;
        let macd_values = macd
            .histogram
            .defined()
            .chain(macd.macd_line.defined())
            .chain(macd.signal_line.defined())
            .map(|(_, v)| v)
            .chain(std::iter::once(0.0));
        let (y_min, y_max) = padded_range(macd_values)
            .ok_or_else(|| ChartError::Render("no MACD values to plot".to_string()))?;

        let mut chart = ChartBuilder::on(&macd_area)
            .margin(8)
            .x_label_area_size(30)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_min..y_max)
            .map_err(render_err("build MACD panel"))?;
        draw_mesh(&mut chart, "MACD", 4, Some(&x_formatter as &dyn Fn(&f64) -> String))?;

        chart
            .draw_series(macd.histogram.defined().map(|(i, v)| {
                let color = if v >= 0.0 { UP } else { DOWN };
                let x = i as f64;
                Rectangle::new([(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, v)], color.filled())
            }))
            .map_err(render_err("draw MACD histogram"))?;

        chart
            .draw_series(LineSeries::new(
                macd.macd_line.defined().map(|(i, v)| (i as f64, v)),
                MACD_COLOR.stroke_width(1),
            ))
            .map_err(render_err("draw MACD line"))?;

        chart
            .draw_series(LineSeries::new(
                macd.signal_line.defined().map(|(i, v)| (i as f64, v)),
                SIGNAL_COLOR.stroke_width(1),
            ))
            .map_err(render_err("draw signal line"))?;
    }

    root.present().map_err(render_err("render chart"))?;
    Ok(())
}
