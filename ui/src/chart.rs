use leptos::*;
use metrics_core::{CycleResult, MetricKind, MetricSeries};

pub const BAR_COLOR: &str = "#57c05e";
/// Bar thickness as a share of its row.
pub const BAR_PERCENTAGE: f64 = 0.3;
pub const CHART_WIDTH: f64 = 640.0;
pub const ROW_HEIGHT: f64 = 28.0;
const AXIS_HEIGHT: f64 = 22.0;
const LABEL_CHAR_PX: f64 = 7.0;
const LABEL_GAP_PX: f64 = 10.0;
const TICKS: usize = 4;

pub fn value_label(value: f64) -> String {
    format!("{value:.1}")
}

/// Estimated rendered width of `text` at the chart font size.
pub fn label_width(text: &str) -> f64 {
    text.chars().count() as f64 * LABEL_CHAR_PX + LABEL_GAP_PX
}

/// Left and right reservations shared by both charts so their plot areas line up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Gutters {
    pub left: f64,
    pub right: f64,
}

impl Gutters {
    pub fn for_cycle(cycle: &CycleResult) -> Self {
        let series = MetricKind::ALL
            .iter()
            .filter_map(|k| cycle.outcome(*k).series());
        let mut gutters = Gutters::default();
        for s in series {
            for (label, value) in s.iter() {
                gutters.left = gutters.left.max(label_width(label));
                gutters.right = gutters.right.max(label_width(&value_label(value)));
            }
        }
        gutters
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarRect {
    pub label: String,
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartGeometry {
    pub bars: Vec<BarRect>,
    pub plot_left: f64,
    pub plot_width: f64,
    pub height: f64,
    /// (x, value) of each axis tick, including zero.
    pub ticks: Vec<(f64, f64)>,
}

/// Horizontal bars scaled against the shared axis maximum.
pub fn layout_bars(series: &MetricSeries, axis_max: f64, gutters: Gutters) -> ChartGeometry {
    let scale_max = if axis_max > 0.0 { axis_max } else { 1.0 };
    let plot_left = gutters.left;
    let plot_width = (CHART_WIDTH - gutters.left - gutters.right).max(1.0);
    let thickness = ROW_HEIGHT * BAR_PERCENTAGE;

    let bars = series
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let fraction = (value / scale_max).clamp(0.0, 1.0);
            BarRect {
                label: label.to_string(),
                value,
                x: plot_left,
                y: i as f64 * ROW_HEIGHT + (ROW_HEIGHT - thickness) / 2.0,
                width: fraction * plot_width,
                height: thickness,
            }
        })
        .collect();

    let ticks = (0..=TICKS)
        .map(|t| {
            let f = t as f64 / TICKS as f64;
            (plot_left + f * plot_width, f * scale_max)
        })
        .collect();

    ChartGeometry {
        bars,
        plot_left,
        plot_width,
        height: series.len() as f64 * ROW_HEIGHT + AXIS_HEIGHT,
        ticks,
    }
}

#[component]
pub fn BarGraph(title: &'static str, series: MetricSeries, axis_max: f64, gutters: Gutters) -> impl IntoView {
    let geometry = layout_bars(&series, axis_max, gutters);
    let plot_bottom = geometry.height - AXIS_HEIGHT;
    let view_box = format!("0 0 {CHART_WIDTH} {}", geometry.height);

    let rows = geometry
        .bars
        .iter()
        .map(|bar| {
            let text_y = bar.y + bar.height / 2.0 + 4.0;
            let label_x = bar.x - LABEL_GAP_PX / 2.0;
            let value_x = bar.x + bar.width + LABEL_GAP_PX / 2.0;
            view! {
                <g class="bar-row">
                    <text x=label_x y=text_y text-anchor="end" class="bar-label">
                        {bar.label.clone()}
                    </text>
                    <rect x=bar.x y=bar.y width=bar.width height=bar.height fill=BAR_COLOR rx="2"/>
                    <text x=value_x y=text_y class="bar-value">
                        {value_label(bar.value)}
                    </text>
                </g>
            }
        })
        .collect_view();

    let ticks = geometry
        .ticks
        .iter()
        .map(|&(x, v)| {
            let label_y = plot_bottom + 16.0;
            view! {
                <line x1=x y1="0" x2=x y2=plot_bottom class="grid-line"/>
                <text x=x y=label_y text-anchor="middle" class="tick-label">
                    {format!("{v:.0}")}
                </text>
            }
        })
        .collect_view();

    view! {
        <div class="bar-graph">
            <div class="section-label">{title}</div>
            <svg class="bar-chart" viewBox=view_box width="100%" preserveAspectRatio="xMinYMin meet">
                {ticks}
                {rows}
            </svg>
        </div>
    }
}
