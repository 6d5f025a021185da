//! Dashboard rendering: a 3x3 grid of TCP vs UDP charts plus a summary table.

use crate::config::{ImageFormat, RenderConfig};
use crate::derive::AnalysisTable;
use crate::display::stats_rows;
use crate::summary::Summary;
use crate::table::{Protocol, ProtocolSample};
use anyhow::{Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;

pub const SUPTITLE: &str = "CSMA Ethernet Performance: TCP vs UDP Analysis";

const STEELBLUE: RGBColor = RGBColor(70, 130, 180);
const CORAL: RGBColor = RGBColor(255, 127, 80);
const HEADER_FILL: RGBColor = RGBColor(0x44, 0x72, 0xC4);

const BAR_WIDTH: f64 = 0.35;
const BAR_METRICS: [&str; 3] = ["Throughput (Mbps)", "PDR (%)", "Packets Received (x10k)"];
const PERCENT_RANGE: Range<f64> = 0.0..105.0;

/// Font sizes (points) and spacing ratios
const BASE_PT: f64 = 9.0;
const PANEL_TITLE_PT: f64 = 12.0;
const SUPTITLE_PT: f64 = 16.0;
const BAR_TICK_PT: f64 = 8.0;
const HSPACE: f64 = 0.35;
const WSPACE: f64 = 0.3;
const TABLE_COL_WIDTHS: [f64; 3] = [0.35, 0.3, 0.3];

/// Pixel sizes derived from the configured DPI
struct Theme {
    base: f64,
    title: f64,
    suptitle: f64,
    bar_tick: f64,
    line_width: u32,
    outline_width: u32,
    margin: u32,
    label_area: u32,
}

impl Theme {
    fn new(cfg: &RenderConfig) -> Self {
        let px = |pt: f64| cfg.px(pt);
        Self {
            base: px(BASE_PT),
            title: px(PANEL_TITLE_PT),
            suptitle: px(SUPTITLE_PT),
            bar_tick: px(BAR_TICK_PT),
            line_width: px(1.5).round().max(1.0) as u32,
            outline_width: px(2.0).round().max(1.0) as u32,
            margin: px(4.0).round() as u32,
            label_area: px(BASE_PT * 4.0).round() as u32,
        }
    }

    fn font(&self, size: f64) -> FontDesc<'static> {
        FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
    }

    fn bold(&self, size: f64) -> FontDesc<'static> {
        FontDesc::new(FontFamily::SansSerif, size, FontStyle::Bold)
    }

    fn legend_len(&self) -> i32 {
        (self.base * 2.0) as i32
    }
}

fn protocol_color(protocol: Protocol) -> RGBColor {
    match protocol {
        Protocol::Tcp => BLUE,
        Protocol::Udp => RED,
    }
}

fn bar_color(protocol: Protocol) -> RGBColor {
    match protocol {
        Protocol::Tcp => STEELBLUE,
        Protocol::Udp => CORAL,
    }
}

/// Render the dashboard to `cfg.output`, choosing the backend by extension
pub fn render(table: &AnalysisTable<'_>, summary: &Summary, cfg: &RenderConfig) -> Result<()> {
    let format = cfg.validate()?;
    let size = cfg.pixel_size();
    let theme = Theme::new(cfg);

    match format {
        ImageFormat::Png => {
            let root = BitMapBackend::new(&cfg.output, size).into_drawing_area();
            draw_dashboard(&root, table, summary, &theme)?;
            root.present()
                .with_context(|| format!("Failed to write image: {}", cfg.output.display()))?;
        }
        ImageFormat::Svg => {
            let root = SVGBackend::new(&cfg.output, size).into_drawing_area();
            draw_dashboard(&root, table, summary, &theme)?;
            root.present()
                .with_context(|| format!("Failed to write image: {}", cfg.output.display()))?;
        }
    }

    log::info!(
        "Rendered {}x{} dashboard to {}",
        size.0,
        size.1,
        cfg.output.display()
    );
    Ok(())
}

/// Draw all nine panels onto `root`
fn draw_dashboard<DB>(
    root: &DrawingArea<DB, Shift>,
    table: &AnalysisTable<'_>,
    summary: &Summary,
    theme: &Theme,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let body = root.titled(SUPTITLE, theme.bold(theme.suptitle))?;
    let panels = body.split_evenly((3, 3));

    let (body_w, body_h) = body.dim_in_pixel();
    let gap_x = (body_w as f64 / 3.0 * WSPACE / 2.0) as u32;
    let gap_y = (body_h as f64 / 3.0 * HSPACE / 2.0) as u32;
    let panels: Vec<_> = panels
        .iter()
        .map(|p| p.margin(gap_y / 2, gap_y, gap_x / 2, gap_x / 2))
        .collect();

    let times = table.times();
    let to_kb = |v: Vec<f64>| v.into_iter().map(|b| b / 1024.0).collect::<Vec<_>>();

    let line_panels = [
        LinePanel {
            title: "Throughput Comparison",
            y_desc: "Mbps",
            series: per_protocol(table, |s| s.throughput_mbps),
            y_range: None,
        },
        LinePanel {
            title: "Packet Delivery Ratio",
            y_desc: "PDR (%)",
            series: [
                table.derived_column(Protocol::Tcp, |d| d.delivery_ratio),
                table.derived_column(Protocol::Udp, |d| d.delivery_ratio),
            ],
            y_range: Some(PERCENT_RANGE),
        },
        LinePanel {
            title: "Cumulative Packets Received",
            y_desc: "Packets",
            series: per_protocol(table, |s| s.received),
            y_range: None,
        },
        LinePanel {
            title: "Cumulative Data Received",
            y_desc: "KB",
            series: per_protocol(table, |s| s.bytes_received).map(to_kb),
            y_range: None,
        },
        LinePanel {
            title: "Packet Loss Over Time",
            y_desc: "Packets Lost",
            series: [
                table.derived_column(Protocol::Tcp, |d| d.packets_lost),
                table.derived_column(Protocol::Udp, |d| d.packets_lost),
            ],
            y_range: None,
        },
        LinePanel {
            title: "Cumulative Packets Sent",
            y_desc: "Packets Sent",
            series: per_protocol(table, |s| s.sent),
            y_range: None,
        },
    ];

    for (area, panel) in panels.iter().zip(line_panels.iter()) {
        draw_line_panel(area, &times, panel, theme)?;
    }

    draw_final_bars(&panels[6], table, theme)?;

    let efficiency = [
        table.derived_column(Protocol::Tcp, |d| d.efficiency),
        table.derived_column(Protocol::Udp, |d| d.efficiency),
    ];
    draw_efficiency(&panels[7], &times, &efficiency, theme)?;

    draw_stats_table(&panels[8], summary, theme)?;
    Ok(())
}

fn per_protocol<F>(table: &AnalysisTable<'_>, f: F) -> [Vec<f64>; 2]
where
    F: Fn(&ProtocolSample) -> f64 + Copy,
{
    [
        table.base_column(Protocol::Tcp, f),
        table.base_column(Protocol::Udp, f),
    ]
}

/// Two time series (TCP, UDP) sharing one set of axes
struct LinePanel {
    title: &'static str,
    y_desc: &'static str,
    series: [Vec<f64>; 2],
    y_range: Option<Range<f64>>,
}

fn time_range(times: &[f64]) -> Range<f64> {
    let start = times.first().copied().unwrap_or(0.0);
    let end = times.last().copied().unwrap_or(1.0);
    if end > start {
        start..end
    } else {
        start..start + 1.0
    }
}

/// Zero-based range covering every value with 10% headroom
fn value_range<'a>(series: impl IntoIterator<Item = &'a Vec<f64>>) -> Range<f64> {
    let max = series
        .into_iter()
        .flat_map(|s| s.iter().cloned())
        .fold(0.0_f64, f64::max);
    let max = if max > 0.0 { max } else { 1.0 };
    0.0..max * 1.1
}

fn draw_line_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    times: &[f64],
    panel: &LinePanel,
    theme: &Theme,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let y_range = panel
        .y_range
        .clone()
        .unwrap_or_else(|| value_range(panel.series.iter()));

    let mut chart = ChartBuilder::on(area)
        .caption(panel.title, theme.font(theme.title))
        .margin(theme.margin)
        .x_label_area_size(theme.label_area)
        .y_label_area_size(theme.label_area + theme.label_area / 2)
        .build_cartesian_2d(time_range(times), y_range)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc(panel.y_desc)
        .label_style(theme.font(theme.base))
        .axis_desc_style(theme.font(theme.base))
        .bold_line_style(BLACK.mix(0.3))
        .light_line_style(BLACK.mix(0.08))
        .draw()?;

    for (protocol, values) in Protocol::ALL.into_iter().zip(panel.series.iter()) {
        let style = protocol_color(protocol).stroke_width(theme.line_width);
        let len = theme.legend_len();
        chart
            .draw_series(LineSeries::new(
                times.iter().zip(values.iter()).map(|(x, y)| (*x, *y)),
                style,
            ))?
            .label(protocol.label())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + len, y)], style));
    }

    draw_legend(&mut chart, theme)?;
    Ok(())
}

fn draw_legend<'a, DB, X, Y>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<X, Y>>,
    theme: &Theme,
) -> Result<()>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
    X: Ranged,
    Y: Ranged,
{
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(theme.font(theme.base))
        .legend_area_size(theme.legend_len() + theme.margin as i32)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;
    Ok(())
}

/// Final values shown in the grouped bar chart
pub fn final_bar_values(sample: &ProtocolSample, delivery_ratio: f64) -> [f64; 3] {
    [
        sample.throughput_mbps,
        delivery_ratio,
        sample.received / 10_000.0,
    ]
}

fn bar_tick_label(v: f64) -> String {
    let idx = v.round();
    if (v - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    BAR_METRICS
        .get(idx as usize)
        .map(|s| s.to_string())
        .unwrap_or_default()
}

fn draw_final_bars<DB>(
    area: &DrawingArea<DB, Shift>,
    table: &AnalysisTable<'_>,
    theme: &Theme,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (last, derived) = table.last();
    let values: Vec<(Protocol, [f64; 3])> = Protocol::ALL
        .into_iter()
        .map(|p| {
            (
                p,
                final_bar_values(last.protocol(p), derived.protocol(p).delivery_ratio),
            )
        })
        .collect();
    let y_max = values
        .iter()
        .flat_map(|(_, v)| v.iter().cloned())
        .fold(0.0_f64, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(area)
        .caption("Final Metrics Comparison", theme.font(theme.title))
        .margin(theme.margin)
        .x_label_area_size(theme.label_area)
        .y_label_area_size(theme.label_area + theme.label_area / 2)
        .build_cartesian_2d(-0.5f64..BAR_METRICS.len() as f64 - 0.5, 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(BAR_METRICS.len())
        .x_label_formatter(&|v| bar_tick_label(*v))
        .x_label_style(theme.font(theme.bar_tick))
        .y_label_style(theme.font(theme.base))
        .bold_line_style(BLACK.mix(0.3))
        .light_line_style(BLACK.mix(0.08))
        .draw()?;

    for (i, (protocol, vals)) in values.iter().enumerate() {
        let color = bar_color(*protocol);
        // TCP sits left of each tick, UDP right
        let offset = if i == 0 { -BAR_WIDTH } else { 0.0 };
        let half = theme.legend_len() / 4;
        let len = theme.legend_len();
        chart
            .draw_series(vals.iter().enumerate().map(move |(x, v)| {
                let left = x as f64 + offset;
                Rectangle::new([(left, 0.0), (left + BAR_WIDTH, *v)], color.filled())
            }))?
            .label(protocol.label())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - half), (x + len, y + half)], color.filled())
            });
    }

    draw_legend(&mut chart, theme)?;
    Ok(())
}

fn draw_efficiency<DB>(
    area: &DrawingArea<DB, Shift>,
    times: &[f64],
    efficiency: &[Vec<f64>; 2],
    theme: &Theme,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .caption("Protocol Efficiency Over Time", theme.font(theme.title))
        .margin(theme.margin)
        .x_label_area_size(theme.label_area)
        .y_label_area_size(theme.label_area + theme.label_area / 2)
        .build_cartesian_2d(time_range(times), PERCENT_RANGE)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Efficiency (%)")
        .label_style(theme.font(theme.base))
        .axis_desc_style(theme.font(theme.base))
        .bold_line_style(BLACK.mix(0.3))
        .light_line_style(BLACK.mix(0.08))
        .draw()?;

    for (protocol, values) in Protocol::ALL.into_iter().zip(efficiency.iter()) {
        let fill = protocol_color(protocol).mix(0.3);
        let half = theme.legend_len() / 4;
        let len = theme.legend_len();
        chart
            .draw_series(AreaSeries::new(
                times.iter().zip(values.iter()).map(|(x, y)| (*x, *y)),
                0.0,
                fill,
            ))?
            .label(protocol.label())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - half), (x + len, y + half)], fill.filled())
            });
    }

    for (protocol, values) in Protocol::ALL.into_iter().zip(efficiency.iter()) {
        chart.draw_series(LineSeries::new(
            times.iter().zip(values.iter()).map(|(x, y)| (*x, *y)),
            protocol_color(protocol).stroke_width(theme.outline_width),
        ))?;
    }

    draw_legend(&mut chart, theme)?;
    Ok(())
}

/// Centered text grid with a filled header row
fn draw_stats_table<DB>(
    area: &DrawingArea<DB, Shift>,
    summary: &Summary,
    theme: &Theme,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let rows = stats_rows(summary);
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as f64, h as f64);

    let row_h = theme.base * 2.4;
    let table_w: f64 = TABLE_COL_WIDTHS.iter().sum::<f64>() * w;
    let table_h = row_h * rows.len() as f64;
    let x0 = (w - table_w) / 2.0;
    let y0 = ((h - table_h) / 2.0).max(0.0);

    let header_font = theme.bold(theme.base);
    let body_font = theme.font(theme.base);
    let center = Pos::new(HPos::Center, VPos::Center);

    for (r, row) in rows.iter().enumerate() {
        let top = y0 + row_h * r as f64;
        let mut left = x0;
        for (c, text) in row.iter().enumerate() {
            let cell_w = TABLE_COL_WIDTHS[c] * w;
            let corners = [
                (left as i32, top as i32),
                ((left + cell_w) as i32, (top + row_h) as i32),
            ];

            let text_style = if r == 0 {
                area.draw(&Rectangle::new(corners, HEADER_FILL.filled()))?;
                TextStyle::from(header_font.clone()).color(&WHITE)
            } else {
                area.draw(&Rectangle::new(corners, WHITE.filled()))?;
                TextStyle::from(body_font.clone()).color(&BLACK)
            };
            area.draw(&Rectangle::new(corners, BLACK.stroke_width(1)))?;

            let anchor = (
                (left + cell_w / 2.0) as i32,
                (top + row_h / 2.0) as i32,
            );
            area.draw(&Text::new(text.clone(), anchor, text_style.pos(center)))?;
            left += cell_w;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive;
    use crate::fonts;
    use crate::source::{MetricsSource, SyntheticSource};
    use std::path::Path;

    fn synthetic() -> crate::table::MetricsTable {
        SyntheticSource {
            seed: 42,
            start: 0.0,
            end: 10.0,
            points: 50,
        }
        .load()
        .unwrap()
    }

    /// Rendering needs a TrueType font; skip on machines without one
    fn have_font() -> bool {
        match fonts::register(None) {
            Ok(_) => true,
            Err(e) => {
                eprintln!("skipping render test: {e}");
                false
            }
        }
    }

    fn render_to(path: &Path) {
        let table = synthetic();
        let analysis = derive(&table);
        let summary = Summary::from_table(&analysis);
        let cfg = RenderConfig {
            output: path.to_path_buf(),
            dpi: 30,
            ..RenderConfig::default()
        };
        render(&analysis, &summary, &cfg).unwrap();
    }

    #[test]
    fn renders_non_empty_png() {
        if !have_font() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dashboard.png");
        render_to(&out);
        let meta = std::fs::metadata(&out).unwrap();
        assert!(meta.len() > 0);
        let bytes = std::fs::read(&out).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn renders_svg_with_titles() {
        if !have_font() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dashboard.svg");
        render_to(&out);
        let svg = std::fs::read_to_string(&out).unwrap();
        assert!(svg.contains("Throughput Comparison"));
        assert!(svg.contains("Protocol Efficiency Over Time"));
        assert!(svg.contains("Total Packets Received"));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let table = synthetic();
        let analysis = derive(&table);
        let summary = Summary::from_table(&analysis);
        let cfg = RenderConfig {
            output: "out.bmpx".into(),
            ..RenderConfig::default()
        };
        assert!(render(&analysis, &summary, &cfg).is_err());
    }

    #[test]
    fn bar_ticks_map_to_metric_names() {
        assert_eq!(bar_tick_label(0.0), "Throughput (Mbps)");
        assert_eq!(bar_tick_label(2.0), "Packets Received (x10k)");
        assert_eq!(bar_tick_label(0.5), "");
        assert_eq!(bar_tick_label(-1.0), "");
        assert_eq!(bar_tick_label(3.0), "");
    }

    #[test]
    fn final_bars_scale_received_packets() {
        let sample = ProtocolSample {
            sent: 25_000.0,
            received: 24_975.0,
            bytes_received: 0.0,
            throughput_mbps: 4.8,
            delivery_ratio: 101.0,
        };
        assert_eq!(final_bar_values(&sample, 100.0), [4.8, 100.0, 2.4975]);
    }

    #[test]
    fn ranges_have_headroom_and_never_collapse() {
        assert_eq!(time_range(&[2.0]), 2.0..3.0);
        assert_eq!(time_range(&[0.0, 10.0]), 0.0..10.0);
        let r = value_range([&vec![0.0, 10.0], &vec![5.0]]);
        assert_eq!(r.start, 0.0);
        assert!((r.end - 11.0).abs() < 1e-9);
        assert_eq!(value_range([&vec![0.0]]), 0.0..1.1);
    }
}
