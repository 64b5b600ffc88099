use async_trait::async_trait;
use futures::future::join;
use log::{debug, warn};
use metrics_core::{
    CycleResult, FetchOutcome, MetricKind, MetricSeries, QueryWindow, Timestamp,
    DEFAULT_WINDOW_SECS,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod table;

pub use table::{rows_from_cycle, ProcessRow};

const DEFAULT_BASE_URL: &str = "/api/query";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub base_url: String,
    pub window_secs: i64,
}

impl QueryConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            window_secs: DEFAULT_WINDOW_SECS,
        }
    }

    pub fn with_window_secs(mut self, window_secs: i64) -> Self {
        self.window_secs = window_secs.max(1);
        self
    }

    /// Queries are posted to the root of the service.
    pub fn endpoint(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("query service returned status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Body of a range query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub measurement: String,
    pub machine_name: String,
    pub start: String,
    pub stop: String,
}

impl QueryRequest {
    pub fn new(kind: MetricKind, machine_name: &str, window: &QueryWindow) -> Self {
        Self {
            measurement: kind.measurement().to_string(),
            machine_name: machine_name.to_string(),
            start: window.start.clone(),
            stop: window.stop.clone(),
        }
    }
}

/// One row of a query response; extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPoint {
    #[serde(rename = "_field")]
    pub field: String,
    #[serde(rename = "_value")]
    pub value: f64,
}

pub fn parse_points(body: &str) -> Result<Vec<QueryPoint>, QueryError> {
    serde_json::from_str(body).map_err(|e| QueryError::Decode(e.to_string()))
}

/// Anything that can answer a range query. `?Send` so browser futures qualify.
#[async_trait(?Send)]
pub trait MetricSource {
    async fn query(&self, request: &QueryRequest) -> Result<Vec<QueryPoint>, QueryError>;
}

#[derive(Clone)]
pub struct HttpMetricSource {
    config: QueryConfig,
    #[cfg(not(target_arch = "wasm32"))]
    http: reqwest::Client,
}

impl HttpMetricSource {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(config: QueryConfig) -> Result<Self, QueryError> {
        let http = reqwest::Client::builder()
            .user_agent("metrics-dashboard/0.1")
            .build()
            .map_err(|e| QueryError::Transport(e.to_string()))?;
        Ok(Self { config, http })
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new(config: QueryConfig) -> Result<Self, QueryError> {
        Ok(Self { config })
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait(?Send)]
impl MetricSource for HttpMetricSource {
    async fn query(&self, request: &QueryRequest) -> Result<Vec<QueryPoint>, QueryError> {
        let resp = self
            .http
            .post(self.config.endpoint())
            .json(request)
            .send()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(QueryError::Status(resp.status().as_u16()));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;
        parse_points(&body)
    }
}

#[cfg(target_arch = "wasm32")]
#[async_trait(?Send)]
impl MetricSource for HttpMetricSource {
    async fn query(&self, request: &QueryRequest) -> Result<Vec<QueryPoint>, QueryError> {
        use gloo_net::http::Request;

        let resp = Request::post(&self.config.endpoint())
            .json(request)
            .map_err(|e| QueryError::Transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;
        if !resp.ok() {
            return Err(QueryError::Status(resp.status()));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;
        parse_points(&body)
    }
}

/// Run one query and fold the response into a tagged outcome. Failures are logged, not raised.
pub async fn fetch_outcome<S>(
    source: &S,
    kind: MetricKind,
    machine_name: &str,
    window: &QueryWindow,
) -> FetchOutcome
where
    S: MetricSource + ?Sized,
{
    let request = QueryRequest::new(kind, machine_name, window);
    match source.query(&request).await {
        Ok(points) => {
            debug!(
                "{} for {}: {} points",
                request.measurement,
                machine_name,
                points.len()
            );
            FetchOutcome::from_series(MetricSeries::from_points(
                kind,
                points.into_iter().map(|p| (p.field, p.value)),
            ))
        }
        Err(err) => {
            warn!("{} query for {} failed: {err}", request.measurement, machine_name);
            FetchOutcome::Failed(err.to_string())
        }
    }
}

/// Query both metrics concurrently and wait for both to settle.
pub async fn run_cycle<S>(
    source: &S,
    seq: u64,
    machine_name: &str,
    anchor: Timestamp,
    now: Timestamp,
    window_secs: i64,
) -> CycleResult
where
    S: MetricSource + ?Sized,
{
    let window = QueryWindow::for_anchor(anchor, now, window_secs);
    let (cpu, memory) = join(
        fetch_outcome(source, MetricKind::Cpu, machine_name, &window),
        fetch_outcome(source, MetricKind::Memory, machine_name, &window),
    )
    .await;
    CycleResult { seq, cpu, memory }
}


#[cfg(test)]
mod tests {
    use super::testing::{points, FakeSource};
    use super::*;
    use metrics_core::{MINUTE_MS, MS};

    const NOW: Timestamp = 1_700_000_000_000;

    #[test]
    fn endpoint_posts_to_service_root() {
        assert_eq!(QueryConfig::new("http://db:8086/").endpoint(), "http://db:8086/");
        assert_eq!(QueryConfig::default().endpoint(), "/api/query/");
        assert_eq!(QueryConfig::default().with_window_secs(0).window_secs, 1);
    }

    #[test]
    fn parse_ignores_extra_columns() {
        let body = r#"[
            {"_field": "nginx", "_value": 12.5, "_time": "2024-03-01T20:00:00Z", "host": "a"},
            {"_field": "postgres", "_value": 3}
        ]"#;
        let parsed = parse_points(body).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].field, "postgres");
        assert_eq!(parsed[1].value, 3.0);
    }

    #[test]
    fn parse_rejects_malformed_body() {
        let err = parse_points(r#"{"error": "bad flux"}"#).unwrap_err();
        assert!(matches!(err, QueryError::Decode(_)));
    }

    #[test]
    fn request_serializes_wire_names() {
        let req = QueryRequest::new(MetricKind::Memory, "web-01", &QueryWindow::latest(15));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["measurement"], "proc_by_memory_percent");
        assert_eq!(json["machine_name"], "web-01");
        assert_eq!(json["start"], "-15s");
        assert_eq!(json["stop"], "now()");
    }

    #[tokio::test]
    async fn cycle_issues_one_query_per_metric() {
        let source = FakeSource::default()
            .with(MetricKind::Cpu, Ok(points(&[("nginx", 40.0)])))
            .with(MetricKind::Memory, Ok(points(&[("nginx", 12.0)])));
        let cycle = run_cycle(&source, 1, "web-01", NOW, NOW, 15).await;

        let requests = source.requests.borrow();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].measurement, "proc_by_cpu_percent");
        assert_eq!(requests[1].measurement, "proc_by_memory_percent");
        assert!(requests.iter().all(|r| r.start == "-15s" && r.stop == "now()"));
        assert_eq!(cycle.seq, 1);
        assert_eq!(cycle.peak(), 40.0);
    }

    #[tokio::test]
    async fn historical_anchor_shifts_both_queries() {
        let source = FakeSource::default();
        let anchor = NOW - 5 * MINUTE_MS - 10 * MS;
        run_cycle(&source, 1, "web-01", anchor, NOW, 15).await;
        for req in source.requests.borrow().iter() {
            assert_eq!(req.start, "-300s");
            assert_eq!(req.stop, "-285s");
        }
    }

    #[tokio::test]
    async fn failed_query_does_not_block_the_other() {
        let source = FakeSource::default()
            .with(MetricKind::Cpu, Err(QueryError::Status(502)))
            .with(MetricKind::Memory, Ok(points(&[("redis", 7.26)])));
        let cycle = run_cycle(&source, 3, "db-02", NOW, NOW, 15).await;

        assert!(cycle.cpu.is_failed());
        assert!(cycle.shows_placeholder());
        let memory = cycle.memory.series().unwrap();
        assert_eq!(memory.values, vec![7.3]);
    }

    #[tokio::test]
    async fn empty_response_is_distinct_from_failure() {
        let source = FakeSource::default().with(MetricKind::Cpu, Ok(Vec::new()));
        let cycle = run_cycle(&source, 1, "db-02", NOW, NOW, 15).await;
        assert_eq!(cycle.cpu, FetchOutcome::Empty);
        assert!(!cycle.any_failed());
        assert!(cycle.shows_placeholder());
    }
}
