use metrics_core::{TimeWindow, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod picker;
pub mod routes;

pub use config::{ConfigError, DashboardConfig};
pub use routes::{path_segments, Breadcrumb, Machine, MachineLink, RouteEntry, RouteTable};

/// Local-storage key for the persisted panel layout.
pub const LAYOUT_STORAGE_KEY: &str = "statistics-panels";

/// Panel group direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}

/// Which panels are shown. At least one of the two is always on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelVisibility {
    show_table: bool,
    show_graphs: bool,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self {
            show_table: true,
            show_graphs: true,
        }
    }
}

impl PanelVisibility {
    pub fn show_table(&self) -> bool {
        self.show_table
    }

    pub fn show_graphs(&self) -> bool {
        self.show_graphs
    }

    pub fn both(&self) -> bool {
        self.show_table && self.show_graphs
    }

    /// Hiding the table forces the graphs back on.
    pub fn toggle_table(&mut self) {
        self.show_table = !self.show_table;
        if !self.show_table {
            self.show_graphs = true;
        }
    }

    /// Hiding the graphs forces the table back on.
    pub fn toggle_graphs(&mut self) {
        self.show_graphs = !self.show_graphs;
        if !self.show_graphs {
            self.show_table = true;
        }
    }

    pub fn table_tooltip(&self) -> &'static str {
        if self.show_table {
            "Hide Table"
        } else {
            "Show Table"
        }
    }

    pub fn graphs_tooltip(&self) -> &'static str {
        if self.show_graphs {
            "Hide Graphs"
        } else {
            "Show Graphs"
        }
    }
}

pub const MIN_TABLE_PCT: f64 = 30.0;
pub const MIN_GRAPHS_PCT: f64 = 40.0;

/// Share of the panel group given to the table, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelSplit {
    table_pct: f64,
}

impl Default for PanelSplit {
    fn default() -> Self {
        Self { table_pct: 50.0 }
    }
}

impl PanelSplit {
    pub fn new(table_pct: f64) -> Self {
        let mut split = Self::default();
        split.set_table_pct(table_pct);
        split
    }

    pub fn table_pct(&self) -> f64 {
        self.table_pct
    }

    pub fn graphs_pct(&self) -> f64 {
        100.0 - self.table_pct
    }

    pub fn set_table_pct(&mut self, pct: f64) {
        if pct.is_finite() {
            self.table_pct = pct.clamp(MIN_TABLE_PCT, 100.0 - MIN_GRAPHS_PCT);
        }
    }

    /// Position a drag handle at `offset` pixels into a group `extent` pixels long.
    pub fn drag_to(&mut self, offset: f64, extent: f64) {
        if extent > 0.0 {
            self.set_table_pct(offset / extent * 100.0);
        }
    }
}

/// Panel settings that survive a reload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LayoutPrefs {
    pub visibility: PanelVisibility,
    pub orientation: Orientation,
    pub split: PanelSplit,
}

/// Whether the anchor follows the refresh tick or stays where the user put it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorMode {
    Live,
    Pinned(Timestamp),
}

/// Everything the dashboard shell owns apart from the reactive wiring.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellState {
    pub window: TimeWindow,
    pub now: Timestamp,
    pub mode: AnchorMode,
    /// Bumped on every tick; the table re-queries when it changes.
    pub refresh: u64,
    pub layout: LayoutPrefs,
}

impl ShellState {
    pub fn new(now: Timestamp, history_minutes: i64) -> Self {
        Self {
            window: TimeWindow::ending_at(now, history_minutes),
            now,
            mode: AnchorMode::Live,
            refresh: 0,
            layout: LayoutPrefs::default(),
        }
    }

    pub fn anchor(&self) -> Timestamp {
        self.window.anchor
    }

    pub fn is_live(&self) -> bool {
        self.mode == AnchorMode::Live
    }

    pub fn tick(&mut self, now: Timestamp) {
        self.now = now;
        self.refresh += 1;
        if self.is_live() {
            self.window.advance(now);
        }
    }

    pub fn pin(&mut self, anchor: Timestamp) {
        self.mode = AnchorMode::Pinned(anchor);
        self.window.advance(anchor);
    }

    pub fn resume_live(&mut self, now: Timestamp) {
        self.mode = AnchorMode::Live;
        self.now = now;
        self.window.advance(now);
    }
}

// ---------- Persistence: localStorage ---------------------------------------

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("localStorage unavailable")]
    Unavailable,
    #[error("storage call failed: {0}")]
    Js(String),
    #[error("stored layout is invalid: {0}")]
    Serde(#[from] serde_json::Error),
}

pub fn encode_layout(prefs: &LayoutPrefs) -> Result<String, StorageError> {
    Ok(serde_json::to_string(prefs)?)
}

pub fn decode_layout(json: &str) -> Result<LayoutPrefs, StorageError> {
    let mut prefs: LayoutPrefs = serde_json::from_str(json)?;
    // Stored values may predate the current clamps.
    prefs.split = PanelSplit::new(prefs.split.table_pct);
    if !prefs.visibility.show_table && !prefs.visibility.show_graphs {
        prefs.visibility = PanelVisibility::default();
    }
    Ok(prefs)
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .ok_or(StorageError::Unavailable)?
        .local_storage()
        .map_err(|e| StorageError::Js(format!("{e:?}")))?
        .ok_or(StorageError::Unavailable)
}

#[cfg(target_arch = "wasm32")]
pub fn save_layout_to_local_storage(key: &str, prefs: &LayoutPrefs) -> Result<(), StorageError> {
    let json = encode_layout(prefs)?;
    local_storage()?
        .set_item(key, &json)
        .map_err(|e| StorageError::Js(format!("{e:?}")))
}

/// Returns Ok(None) if nothing was stored.
#[cfg(target_arch = "wasm32")]
pub fn load_layout_from_local_storage(key: &str) -> Result<Option<LayoutPrefs>, StorageError> {
    let value = local_storage()?
        .get_item(key)
        .map_err(|e| StorageError::Js(format!("{e:?}")))?;
    value.as_deref().map(decode_layout).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_core::{MINUTE_MS, MS};

    const NOW: Timestamp = 1_700_000_000_000;

    #[test]
    fn hiding_table_when_graphs_hidden_shows_graphs() {
        let mut v = PanelVisibility::default();
        v.toggle_graphs();
        assert!(v.show_table() && !v.show_graphs());
        v.toggle_table();
        assert!(!v.show_table());
        assert!(v.show_graphs());
    }

    #[test]
    fn toggles_walk_between_three_states() {
        let mut v = PanelVisibility::default();
        assert!(v.both());
        v.toggle_table();
        assert!(!v.show_table() && v.show_graphs());
        v.toggle_table();
        assert!(v.both());
        v.toggle_graphs();
        assert!(v.show_table() && !v.show_graphs());
        v.toggle_graphs();
        assert!(v.both());
    }

    #[test]
    fn tooltips_follow_visibility() {
        let mut v = PanelVisibility::default();
        assert_eq!(v.table_tooltip(), "Hide Table");
        v.toggle_table();
        assert_eq!(v.table_tooltip(), "Show Table");
        assert_eq!(v.graphs_tooltip(), "Hide Graphs");
    }

    #[test]
    fn orientation_flip_is_independent_of_visibility() {
        let mut prefs = LayoutPrefs::default();
        prefs.visibility.toggle_graphs();
        prefs.orientation = prefs.orientation.flipped();
        assert_eq!(prefs.orientation, Orientation::Vertical);
        assert!(!prefs.visibility.show_graphs());
        assert_eq!(prefs.orientation.flipped().as_str(), "horizontal");
    }

    #[test]
    fn split_respects_minimum_sizes() {
        let mut split = PanelSplit::default();
        split.set_table_pct(10.0);
        assert_eq!(split.table_pct(), 30.0);
        split.set_table_pct(95.0);
        assert_eq!(split.table_pct(), 60.0);
        assert_eq!(split.graphs_pct(), 40.0);
        split.drag_to(450.0, 1000.0);
        assert_eq!(split.table_pct(), 45.0);
        split.drag_to(10.0, 0.0);
        assert_eq!(split.table_pct(), 45.0);
        split.set_table_pct(f64::NAN);
        assert_eq!(split.table_pct(), 45.0);
    }

    #[test]
    fn tick_advances_live_anchor_and_refresh() {
        let mut state = ShellState::new(NOW, 30);
        state.tick(NOW + 15 * MS);
        assert_eq!(state.refresh, 1);
        assert_eq!(state.anchor(), NOW + 15 * MS);
        assert_eq!(state.window.past, NOW + 15 * MS - 30 * MINUTE_MS);
    }

    #[test]
    fn pinned_anchor_survives_ticks() {
        let mut state = ShellState::new(NOW, 30);
        let picked = NOW - 90 * MINUTE_MS;
        state.pin(picked);
        state.tick(NOW + 15 * MS);
        state.tick(NOW + 30 * MS);
        assert_eq!(state.anchor(), picked);
        assert_eq!(state.refresh, 2);
        assert_eq!(state.now, NOW + 30 * MS);

        state.resume_live(NOW + 31 * MS);
        assert!(state.is_live());
        assert_eq!(state.anchor(), NOW + 31 * MS);
    }

    #[test]
    fn stored_layout_is_sanitized() {
        let prefs = decode_layout(
            r#"{"visibility":{"show_table":false,"show_graphs":false},"orientation":"vertical","split":{"table_pct":5}}"#,
        )
        .unwrap();
        assert!(prefs.visibility.both());
        assert_eq!(prefs.orientation, Orientation::Vertical);
        assert_eq!(prefs.split.table_pct(), 30.0);
    }

    #[test]
    fn layout_survives_encode_decode() {
        let mut prefs = LayoutPrefs::default();
        prefs.visibility.toggle_table();
        prefs.split.set_table_pct(55.0);
        let decoded = decode_layout(&encode_layout(&prefs).unwrap()).unwrap();
        assert_eq!(decoded, prefs);
    }

    #[test]
    fn empty_storage_value_decodes_to_defaults() {
        assert_eq!(decode_layout("{}").unwrap(), LayoutPrefs::default());
        assert!(decode_layout("[1,2]").is_err());
    }
}
