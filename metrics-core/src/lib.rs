use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::VecDeque;

/// Milliseconds since Unix epoch.
pub type Timestamp = i64;

/// Number of milliseconds in common units.
pub const MS: i64 = 1_000;
pub const MINUTE_MS: i64 = 60 * MS;

/// Width of every range query, in seconds.
pub const DEFAULT_WINDOW_SECS: i64 = 15;
/// How far `TimeWindow::past` trails the anchor.
pub const DEFAULT_HISTORY_MINUTES: i64 = 30;

#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> Timestamp {
    js_sys::Date::now() as Timestamp
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> Timestamp {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Timestamp)
        .unwrap_or(0)
}

/// Tracked per-process metrics, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    Cpu,
    Memory,
}

impl MetricKind {
    pub const ALL: [MetricKind; 2] = [MetricKind::Cpu, MetricKind::Memory];

    /// Measurement name understood by the query service.
    pub fn measurement(&self) -> &'static str {
        match self {
            MetricKind::Cpu => "proc_by_cpu_percent",
            MetricKind::Memory => "proc_by_memory_percent",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Cpu => "CPU %",
            MetricKind::Memory => "Memory %",
        }
    }
}

/// Whole minutes from `now` to `anchor`, truncated toward zero.
/// Negative when the anchor lies in the past.
pub fn whole_minutes_between(anchor: Timestamp, now: Timestamp) -> i64 {
    (anchor - now) / MINUTE_MS
}

/// Relative time range in the query service's syntax (`"-15s"`, `"now()"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow {
    pub start: String,
    pub stop: String,
}

impl QueryWindow {
    /// The most recent `width_secs` seconds.
    pub fn latest(width_secs: i64) -> Self {
        Self {
            start: format!("-{width_secs}s"),
            stop: "now()".to_string(),
        }
    }

    /// A `width_secs` slice starting `diff_minutes` away from now.
    pub fn offset(diff_minutes: i64, width_secs: i64) -> Self {
        let start = diff_minutes * 60;
        Self {
            start: format!("{start}s"),
            stop: format!("{}s", start + width_secs),
        }
    }

    pub fn for_anchor(anchor: Timestamp, now: Timestamp, width_secs: i64) -> Self {
        match whole_minutes_between(anchor, now) {
            0 => Self::latest(width_secs),
            diff => Self::offset(diff, width_secs),
        }
    }
}

/// The shell's time window: an anchor and the instant `history` before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub anchor: Timestamp,
    pub past: Timestamp,
    history_minutes: i64,
}

impl TimeWindow {
    pub fn ending_at(anchor: Timestamp, history_minutes: i64) -> Self {
        Self {
            anchor,
            past: anchor - history_minutes * MINUTE_MS,
            history_minutes,
        }
    }

    /// Move the anchor and re-derive `past`.
    pub fn advance(&mut self, anchor: Timestamp) {
        *self = Self::ending_at(anchor, self.history_minutes);
    }
}

/// Round to one decimal place, halves toward positive infinity.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// One metric's chart-ready series for a single fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub kind: MetricKind,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Largest raw (unrounded) value in the cycle.
    pub max: f64,
}

impl MetricSeries {
    pub fn from_points<I, S>(kind: MetricKind, points: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut labels = Vec::new();
        let mut values = Vec::new();
        let mut max = 0.0_f64;
        for (label, value) in points {
            if value > max {
                max = value;
            }
            labels.push(label.into());
            values.push(round_tenth(value));
        }
        Self {
            kind,
            labels,
            values,
            max,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Tagged per-metric result, so "query failed" stays distinct from "no data".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FetchOutcome {
    Data(MetricSeries),
    Empty,
    Failed(String),
}

impl FetchOutcome {
    pub fn from_series(series: MetricSeries) -> Self {
        if series.is_empty() {
            FetchOutcome::Empty
        } else {
            FetchOutcome::Data(series)
        }
    }

    pub fn series(&self) -> Option<&MetricSeries> {
        match self {
            FetchOutcome::Data(s) => Some(s),
            _ => None,
        }
    }

    pub fn peak(&self) -> f64 {
        self.series().map(|s| s.max).unwrap_or(0.0)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }
}

/// Both metrics of one cycle, committed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleResult {
    pub seq: u64,
    pub cpu: FetchOutcome,
    pub memory: FetchOutcome,
}

impl CycleResult {
    pub fn outcome(&self, kind: MetricKind) -> &FetchOutcome {
        match kind {
            MetricKind::Cpu => &self.cpu,
            MetricKind::Memory => &self.memory,
        }
    }

    /// Largest raw value seen across both metrics this cycle.
    pub fn peak(&self) -> f64 {
        self.cpu.peak().max(self.memory.peak())
    }

    /// The placeholder replaces the charts whenever the first metric has nothing to draw.
    pub fn shows_placeholder(&self) -> bool {
        self.cpu.series().is_none()
    }

    pub fn any_failed(&self) -> bool {
        self.cpu.is_failed() || self.memory.is_failed()
    }
}

/// How the shared axis maximum evolves between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AxisPolicy {
    /// Running maximum for the poller's lifetime; never decreases.
    #[default]
    Session,
    /// Maximum of the current cycle only.
    Cycle,
    /// Maximum over the last N cycles.
    Window(usize),
}

#[derive(Debug, Clone)]
pub struct AxisScale {
    policy: AxisPolicy,
    recent: VecDeque<f64>,
    session_peak: f64,
}

impl AxisScale {
    pub fn new(policy: AxisPolicy) -> Self {
        Self {
            policy,
            recent: VecDeque::new(),
            session_peak: 0.0,
        }
    }

    /// Fold a cycle's peak in and return the axis maximum to display.
    pub fn observe(&mut self, cycle_peak: f64) -> f64 {
        self.session_peak = self.session_peak.max(cycle_peak);
        let keep = match self.policy {
            AxisPolicy::Session => 1,
            AxisPolicy::Cycle => 1,
            AxisPolicy::Window(n) => n.max(1),
        };
        self.recent.push_back(cycle_peak);
        while self.recent.len() > keep {
            self.recent.pop_front();
        }
        self.current()
    }

    pub fn current(&self) -> f64 {
        match self.policy {
            AxisPolicy::Session => self.session_peak,
            AxisPolicy::Cycle | AxisPolicy::Window(_) => {
                self.recent.iter().copied().fold(0.0, f64::max)
            }
        }
    }
}

/// Hands out increasing cycle numbers; only the newest one may commit.
#[derive(Debug, Default)]
pub struct FetchSequencer {
    latest: Cell<u64>,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> u64 {
        let next = self.latest.get() + 1;
        self.latest.set(next);
        next
    }

    /// Retire every cycle issued so far without starting a new one.
    pub fn invalidate(&self) {
        self.issue();
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: Timestamp = 1_700_000_000_000;

    fn series(kind: MetricKind, values: &[f64]) -> MetricSeries {
        MetricSeries::from_points(
            kind,
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("proc-{i}"), *v)),
        )
    }

    #[test]
    fn window_for_live_anchor_is_latest_slice() {
        let w = QueryWindow::for_anchor(NOW, NOW, DEFAULT_WINDOW_SECS);
        assert_eq!(w.start, "-15s");
        assert_eq!(w.stop, "now()");

        // Less than a minute off still counts as now.
        let w = QueryWindow::for_anchor(NOW - 59 * MS, NOW, DEFAULT_WINDOW_SECS);
        assert_eq!(w, QueryWindow::latest(15));
    }

    #[test]
    fn window_for_offset_anchor_uses_signed_minutes() {
        let past = QueryWindow::for_anchor(NOW - 2 * MINUTE_MS - 30 * MS, NOW, 15);
        assert_eq!(past.start, "-120s");
        assert_eq!(past.stop, "-105s");

        let ahead = QueryWindow::for_anchor(NOW + 3 * MINUTE_MS, NOW, 15);
        assert_eq!(ahead.start, "180s");
        assert_eq!(ahead.stop, "195s");
    }

    #[test]
    fn time_window_trails_anchor() {
        let mut w = TimeWindow::ending_at(NOW, DEFAULT_HISTORY_MINUTES);
        assert_eq!(w.anchor - w.past, 30 * MINUTE_MS);
        w.advance(NOW + 15 * MS);
        assert_eq!(w.anchor, NOW + 15 * MS);
        assert_eq!(w.past, NOW + 15 * MS - 30 * MINUTE_MS);
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(round_tenth(73.46), 73.5);
        assert_eq!(round_tenth(73.44), 73.4);
        assert_eq!(round_tenth(0.0), 0.0);
        assert_eq!(round_tenth(12.0), 12.0);
    }

    #[test]
    fn halves_round_toward_positive_infinity() {
        assert_eq!(round_tenth(0.25), 0.3);
        assert_eq!(round_tenth(-0.25), -0.2);
    }

    #[test]
    fn series_keeps_order_and_raw_max() {
        let s = MetricSeries::from_points(
            MetricKind::Cpu,
            vec![("nginx", 12.34), ("postgres", 40.06), ("redis", 3.0)],
        );
        assert_eq!(s.labels, vec!["nginx", "postgres", "redis"]);
        assert_eq!(s.values, vec![12.3, 40.1, 3.0]);
        assert_eq!(s.max, 40.06);
        assert_eq!(s.iter().next(), Some(("nginx", 12.3)));
    }

    #[test]
    fn empty_series_becomes_empty_outcome() {
        let outcome = FetchOutcome::from_series(series(MetricKind::Cpu, &[]));
        assert_eq!(outcome, FetchOutcome::Empty);
        assert_eq!(outcome.peak(), 0.0);
    }

    #[test]
    fn placeholder_follows_first_metric() {
        let cycle = CycleResult {
            seq: 1,
            cpu: FetchOutcome::Empty,
            memory: FetchOutcome::from_series(series(MetricKind::Memory, &[5.0])),
        };
        assert!(cycle.shows_placeholder());

        let cycle = CycleResult {
            seq: 2,
            cpu: FetchOutcome::from_series(series(MetricKind::Cpu, &[1.0])),
            memory: FetchOutcome::Failed("timeout".into()),
        };
        assert!(!cycle.shows_placeholder());
        assert!(cycle.any_failed());
        assert_eq!(cycle.peak(), 1.0);
    }

    #[test]
    fn session_axis_never_decreases() {
        let mut axis = AxisScale::new(AxisPolicy::Session);
        assert_eq!(axis.observe(40.0), 40.0);
        assert_eq!(axis.observe(25.0), 40.0);
        assert_eq!(axis.observe(55.5), 55.5);
    }

    #[test]
    fn cycle_axis_tracks_latest_cycle() {
        let mut axis = AxisScale::new(AxisPolicy::Cycle);
        assert_eq!(axis.observe(40.0), 40.0);
        assert_eq!(axis.observe(25.0), 25.0);
    }

    #[test]
    fn window_axis_forgets_old_spikes() {
        let mut axis = AxisScale::new(AxisPolicy::Window(2));
        axis.observe(90.0);
        assert_eq!(axis.observe(10.0), 90.0);
        assert_eq!(axis.observe(20.0), 20.0);
    }

    #[test]
    fn axis_policy_from_config_json() {
        let p: AxisPolicy = serde_json::from_str("\"cycle\"").unwrap();
        assert_eq!(p, AxisPolicy::Cycle);
        let p: AxisPolicy = serde_json::from_str(r#"{"window":4}"#).unwrap();
        assert_eq!(p, AxisPolicy::Window(4));
    }

    #[test]
    fn sequencer_only_accepts_newest() {
        let seq = FetchSequencer::new();
        let first = seq.issue();
        let second = seq.issue();
        assert!(second > first);
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
    }

    #[test]
    fn invalidate_retires_in_flight_cycle() {
        let seq = FetchSequencer::new();
        let in_flight = seq.issue();
        seq.invalidate();
        assert!(!seq.is_current(in_flight));
    }
}
