use std::time::Duration;

use log::warn;
use metrics_core::{AxisPolicy, DEFAULT_HISTORY_MINUTES, DEFAULT_WINDOW_SECS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::routes::RouteTable;

const BUILTIN_ROUTES: &str = include_str!("../routes.json");

// Names a JSON config file natively, or holds the JSON itself as a browser global.
pub const CONFIG_ENV: &str = "METRICS_DASHBOARD_CONFIG";
// Overrides only the query service base URL.
pub const API_BASE_ENV: &str = "METRICS_API_BASE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid dashboard config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("root_path {0:?} must name a prefix such as \"/statistics\"")]
    EmptyRoot(String),
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_base: String,
    /// URL prefix under which route-table paths live.
    pub root_path: String,
    pub refresh_secs: u32,
    pub history_minutes: i64,
    pub window_secs: i64,
    pub axis_policy: AxisPolicy,
    pub routes: RouteTable,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: "/api/query".to_string(),
            root_path: "/statistics".to_string(),
            refresh_secs: 15,
            history_minutes: DEFAULT_HISTORY_MINUTES,
            window_secs: DEFAULT_WINDOW_SECS,
            axis_policy: AxisPolicy::Session,
            routes: builtin_routes(),
        }
    }
}

pub fn builtin_routes() -> RouteTable {
    serde_json::from_str(BUILTIN_ROUTES).unwrap_or_else(|err| {
        warn!("builtin route table is invalid: {err}");
        RouteTable::default()
    })
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()
    }

    /// An empty root would put the shell route on `/*path` and hide the index page.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.root_prefix().is_empty() {
            return Err(ConfigError::EmptyRoot(self.root_path));
        }
        Ok(self)
    }

    /// `root_path` without trailing slashes.
    pub fn root_prefix(&self) -> &str {
        self.root_path.trim_end_matches('/')
    }

    /// Router pattern for the dashboard shell.
    pub fn shell_route(&self) -> String {
        format!("{}/*path", self.root_prefix())
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.refresh_secs.max(1)))
    }

    /// Config file named by `METRICS_DASHBOARD_CONFIG`, else defaults; `METRICS_API_BASE` wins either way.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, ConfigError> {
        let cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                let json = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Io { path, source })?;
                Self::from_json(&json)?
            }
            Err(_) => Self::default(),
        };
        Ok(match std::env::var(API_BASE_ENV) {
            Ok(base) => cfg.with_api_base(base),
            Err(_) => cfg,
        })
    }
}
