use std::cmp::Ordering;

use metrics_core::{CycleResult, MetricKind};
use serde::Serialize;

/// One process with its latest CPU and memory readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessRow {
    pub process: String,
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
}

/// Join both metrics of a cycle by field name, busiest CPU first.
pub fn rows_from_cycle(cycle: &CycleResult) -> Vec<ProcessRow> {
    let mut rows: Vec<ProcessRow> = Vec::new();
    for kind in MetricKind::ALL {
        let Some(series) = cycle.outcome(kind).series() else {
            continue;
        };
        for (label, value) in series.iter() {
            let idx = match rows.iter().position(|r| r.process == label) {
                Some(idx) => idx,
                None => {
                    rows.push(ProcessRow {
                        process: label.to_string(),
                        cpu: None,
                        memory: None,
                    });
                    rows.len() - 1
                }
            };
            match kind {
                MetricKind::Cpu => rows[idx].cpu = Some(value),
                MetricKind::Memory => rows[idx].memory = Some(value),
            }
        }
    }
    // Stable sort keeps response order among equal or missing CPU readings.
    rows.sort_by(|a, b| match (a.cpu, b.cpu) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_cycle;
    use crate::testing::{points, FakeSource};
    use crate::QueryError;

    #[tokio::test]
    async fn joins_metrics_by_process() {
        let source = FakeSource::default()
            .with(
                MetricKind::Cpu,
                Ok(points(&[("nginx", 2.04), ("postgres", 31.5)])),
            )
            .with(
                MetricKind::Memory,
                Ok(points(&[("postgres", 18.0), ("cron", 0.4)])),
            );
        let cycle = run_cycle(&source, 1, "web-01", 0, 0, 15).await;
        let rows = rows_from_cycle(&cycle);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].process, "postgres");
        assert_eq!(rows[0].cpu, Some(31.5));
        assert_eq!(rows[0].memory, Some(18.0));
        assert_eq!(rows[1].process, "nginx");
        assert_eq!(rows[1].cpu, Some(2.0));
        assert_eq!(rows[1].memory, None);
        assert_eq!(rows[2].process, "cron");
        assert_eq!(rows[2].cpu, None);
    }

    #[tokio::test]
    async fn failed_cycle_yields_no_rows() {
        let source = FakeSource::default()
            .with(MetricKind::Cpu, Err(QueryError::Transport("refused".into())))
            .with(MetricKind::Memory, Err(QueryError::Status(500)));
        let cycle = run_cycle(&source, 1, "web-01", 0, 0, 15).await;
        assert!(rows_from_cycle(&cycle).is_empty());
    }
}
