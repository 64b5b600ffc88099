use dashboard_shell::Machine;
use leptos::*;
use metrics_core::MetricKind;
use query_client::ProcessRow;

#[cfg(target_arch = "wasm32")]
use crate::state::use_app_ctx;
#[cfg(target_arch = "wasm32")]
use metrics_core::{now_ms, FetchSequencer};
#[cfg(target_arch = "wasm32")]
use query_client::{rows_from_cycle, run_cycle, HttpMetricSource};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::spawn_local;

pub fn fmt_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}"),
        None => String::new(),
    }
}

/// Latest per-process readings for the selected machine, re-queried on every refresh.
#[component]
pub fn ProcessTable(
    #[prop(into)] refresh: Signal<u64>,
    #[prop(into)] machine: Signal<Option<Machine>>,
) -> impl IntoView {
    let rows = create_rw_signal(Vec::<ProcessRow>::new());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = (&refresh, &machine);

    #[cfg(target_arch = "wasm32")]
    {
        let ctx = use_app_ctx();
        let sequencer = store_value(FetchSequencer::new());
        create_effect(move |_| {
            let _ = refresh.get();
            let Some(machine) = machine.get() else {
                sequencer.with_value(|s| s.invalidate());
                rows.set(Vec::new());
                return;
            };
            let seq = sequencer.with_value(|s| s.issue());
            let query = ctx.query_config();
            let window_secs = query.window_secs;
            spawn_local(async move {
                let source = match HttpMetricSource::new(query) {
                    Ok(source) => source,
                    Err(err) => {
                        log::warn!("cannot build query source: {err}");
                        return;
                    }
                };
                let now = now_ms();
                let cycle =
                    run_cycle(&source, seq, &machine.machine_name, now, now, window_secs).await;
                if sequencer.with_value(|s| s.is_current(cycle.seq)) {
                    rows.set(rows_from_cycle(&cycle));
                }
            });
        });
    }

    view! {
        <div class="process-table">
            <table>
                <thead>
                    <tr>
                        <th>"Process"</th>
                        <th class="num">{MetricKind::Cpu.label()}</th>
                        <th class="num">{MetricKind::Memory.label()}</th>
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        let rows = rows.get();
                        if rows.is_empty() {
                            return view! {
                                <tr>
                                    <td colspan="3" class="muted">"No Data"</td>
                                </tr>
                            }
                            .into_view();
                        }
                        rows.into_iter()
                            .map(|row| {
                                view! {
                                    <tr>
                                        <td>{row.process}</td>
                                        <td class="num">{fmt_cell(row.cpu)}</td>
                                        <td class="num">{fmt_cell(row.memory)}</td>
                                    </tr>
                                }
                            })
                            .collect_view()
                    }}
                </tbody>
            </table>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_show_one_decimal_or_nothing() {
        assert_eq!(fmt_cell(Some(73.5)), "73.5");
        assert_eq!(fmt_cell(Some(2.0)), "2.0");
        assert_eq!(fmt_cell(None), "");
    }
}
