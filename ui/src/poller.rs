use dashboard_shell::Machine;
use leptos::*;
use metrics_core::{AxisScale, CycleResult, FetchSequencer, MetricKind, Timestamp};

use crate::chart::{BarGraph, Gutters};
use crate::state::use_app_ctx;

#[cfg(target_arch = "wasm32")]
use log::{debug, warn};
#[cfg(target_arch = "wasm32")]
use metrics_core::now_ms;
#[cfg(target_arch = "wasm32")]
use query_client::{run_cycle, HttpMetricSource};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::spawn_local;

/// What the chart panel currently shows. Replaced wholesale per cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    Loading,
    NoMachine,
    Ready { cycle: CycleResult, axis_max: f64 },
}

/// Fold a finished cycle into the axis and build the state to show.
/// Returns `None` when a newer cycle has been issued since; the axis is left untouched.
pub fn commit_cycle(
    cycle: CycleResult,
    sequencer: &FetchSequencer,
    axis: &mut AxisScale,
) -> Option<PollState> {
    if !sequencer.is_current(cycle.seq) {
        return None;
    }
    let axis_max = axis.observe(cycle.peak());
    Some(PollState::Ready { cycle, axis_max })
}

/// Switch to the no-machine state, retiring any cycle still in flight.
pub fn clear_machine(sequencer: &FetchSequencer) -> PollState {
    sequencer.invalidate();
    PollState::NoMachine
}

#[component]
pub fn MetricsPoller(
    #[prop(into)] anchor: Signal<Timestamp>,
    #[prop(into)] machine: Signal<Option<Machine>>,
) -> impl IntoView {
    let ctx = use_app_ctx();
    let policy = ctx.config.with_untracked(|c| c.axis_policy);
    let state = create_rw_signal(PollState::Loading);
    let axis = store_value(AxisScale::new(policy));
    let sequencer = store_value(FetchSequencer::new());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = (&anchor, &machine, &axis, &sequencer);

    #[cfg(target_arch = "wasm32")]
    create_effect(move |_| {
        let anchor = anchor.get();
        let Some(machine) = machine.get() else {
            state.set(sequencer.with_value(clear_machine));
            return;
        };
        let seq = sequencer.with_value(|s| s.issue());
        let query = ctx.query_config();
        let window_secs = query.window_secs;
        spawn_local(async move {
            let source = match HttpMetricSource::new(query) {
                Ok(source) => source,
                Err(err) => {
                    warn!("cannot build query source: {err}");
                    return;
                }
            };
            let cycle = run_cycle(
                &source,
                seq,
                &machine.machine_name,
                anchor,
                now_ms(),
                window_secs,
            )
            .await;
            let seq = cycle.seq;
            let next = axis
                .try_update_value(|a| sequencer.with_value(|s| commit_cycle(cycle, s, a)))
                .flatten();
            match next {
                Some(next) => state.set(next),
                None => debug!("dropping stale cycle {seq} for {}", machine.machine_name),
            }
        });
    });

    view! {
        <div class="poller">
            {move || match state.get() {
                PollState::Loading => view! { <div class="placeholder">"Loading…"</div> }.into_view(),
                PollState::NoMachine => view! { <div class="placeholder">"No Data"</div> }.into_view(),
                PollState::Ready { cycle, .. } if cycle.shows_placeholder() => {
                    let note = cycle
                        .any_failed()
                        .then(|| view! { <div class="status-note">"query failed"</div> });
                    view! {
                        <div class="placeholder">
                            <div>"No Data"</div>
                            {note}
                        </div>
                    }
                    .into_view()
                }
                PollState::Ready { cycle, axis_max } => {
                    let gutters = Gutters::for_cycle(&cycle);
                    MetricKind::ALL
                        .iter()
                        .enumerate()
                        .map(|(i, kind)| {
                            let chart = match cycle.outcome(*kind).series() {
                                Some(series) => view! {
                                    <BarGraph
                                        title=kind.measurement()
                                        series=series.clone()
                                        axis_max=axis_max
                                        gutters=gutters
                                    />
                                }
                                .into_view(),
                                None => view! {
                                    <div class="bar-graph">
                                        <div class="section-label">{kind.measurement()}</div>
                                        <div class="placeholder">"No Data"</div>
                                    </div>
                                }
                                .into_view(),
                            };
                            view! {
                                {chart}
                                {(i == 0).then(|| view! { <hr class="divider"/> })}
                            }
                        })
                        .collect_view()
                }
            }}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_core::{AxisPolicy, FetchOutcome, MetricSeries};

    fn cycle(seq: u64, cpu: &[(&str, f64)]) -> CycleResult {
        let series = MetricSeries::from_points(
            MetricKind::Cpu,
            cpu.iter().map(|(l, v)| (l.to_string(), *v)),
        );
        CycleResult {
            seq,
            cpu: FetchOutcome::from_series(series),
            memory: FetchOutcome::Empty,
        }
    }

    #[test]
    fn current_cycle_commits_with_folded_peak() {
        let seq = FetchSequencer::new();
        let mut axis = AxisScale::new(AxisPolicy::Session);
        let c = cycle(seq.issue(), &[("nginx", 42.0)]);
        let state = commit_cycle(c.clone(), &seq, &mut axis);
        assert_eq!(
            state,
            Some(PollState::Ready {
                cycle: c,
                axis_max: 42.0
            })
        );
    }

    #[test]
    fn late_cycle_is_dropped_and_its_peak_ignored() {
        let seq = FetchSequencer::new();
        let mut axis = AxisScale::new(AxisPolicy::Session);
        let first = seq.issue();
        let second = seq.issue();

        let newer = commit_cycle(cycle(second, &[("redis", 30.0)]), &seq, &mut axis);
        assert!(matches!(newer, Some(PollState::Ready { axis_max, .. }) if axis_max == 30.0));

        let older = commit_cycle(cycle(first, &[("java", 95.0)]), &seq, &mut axis);
        assert_eq!(older, None);
        assert_eq!(axis.current(), 30.0);
    }

    #[test]
    fn leaving_a_machine_drops_its_in_flight_cycle() {
        let seq = FetchSequencer::new();
        let mut axis = AxisScale::new(AxisPolicy::Session);
        let in_flight = seq.issue();

        assert_eq!(clear_machine(&seq), PollState::NoMachine);
        let late = commit_cycle(cycle(in_flight, &[("web", 70.0)]), &seq, &mut axis);
        assert_eq!(late, None);
        assert_eq!(axis.current(), 0.0);
    }
}
