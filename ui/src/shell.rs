use dashboard_shell::picker::format_anchor_label;
use dashboard_shell::{path_segments, LayoutPrefs, Machine, Orientation, ShellState};
use leptos::*;
use leptos_router::use_location;
use log::debug;
use metrics_core::now_ms;

use crate::picker::AnchorPicker;
use crate::poller::MetricsPoller;
use crate::state::{use_app_ctx, utc_offset_minutes};
use crate::table::ProcessTable;

#[cfg(target_arch = "wasm32")]
use dashboard_shell::{load_layout_from_local_storage, save_layout_to_local_storage, LAYOUT_STORAGE_KEY};
#[cfg(target_arch = "wasm32")]
use gloo_timers::callback::Interval;
#[cfg(target_arch = "wasm32")]
use log::warn;

fn panel_style(pct: f64, orientation: Orientation) -> String {
    let min = match orientation {
        Orientation::Horizontal => "min-width: 0",
        Orientation::Vertical => "min-height: 0",
    };
    format!("flex: 0 0 {pct:.2}%; {min};")
}

/// Breadcrumb, toolbar and the table/graph panels for whichever machine the URL names.
#[component]
pub fn DashboardShell() -> impl IntoView {
    let ctx = use_app_ctx();
    let (root, routes, history, refresh_every) = ctx.config.with_untracked(|c| {
        (
            c.root_path.clone(),
            c.routes.clone(),
            c.history_minutes,
            c.refresh_interval(),
        )
    });
    let offset = utc_offset_minutes();
    let shell = create_rw_signal(ShellState::new(now_ms(), history));
    #[cfg(not(target_arch = "wasm32"))]
    let _ = refresh_every;

    #[cfg(target_arch = "wasm32")]
    {
        match load_layout_from_local_storage(LAYOUT_STORAGE_KEY) {
            Ok(Some(prefs)) => shell.update(|s| s.layout = prefs),
            Ok(None) => {}
            Err(err) => warn!("ignoring stored layout: {err}"),
        }

        let interval = Interval::new(refresh_every.as_millis() as u32, move || {
            shell.update(|s| s.tick(now_ms()));
        });
        on_cleanup(move || interval.cancel());
    }

    let layout = create_memo(move |_| shell.with(|s| s.layout));
    #[cfg(target_arch = "wasm32")]
    create_effect(move |_| {
        let prefs = layout.get();
        if let Err(err) = save_layout_to_local_storage(LAYOUT_STORAGE_KEY, &prefs) {
            warn!("could not persist layout: {err}");
        }
    });

    let location = use_location();
    let segments = create_memo(move |_| {
        location.pathname.with(|p| {
            path_segments(p, &root)
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
    });
    let routes = store_value(routes);
    let breadcrumb = create_memo(move |_| {
        segments.with(|segs| {
            let segs: Vec<&str> = segs.iter().map(String::as_str).collect();
            routes
                .with_value(|r| r.breadcrumb(&segs))
                .map(|b| b.to_string())
                .unwrap_or_default()
        })
    });
    let machine = create_memo(move |_| {
        segments.with(|segs| {
            let segs: Vec<&str> = segs.iter().map(String::as_str).collect();
            let machine: Option<Machine> = routes.with_value(|r| r.machine(&segs));
            debug!("route {:?} -> {:?}", segs, machine.as_ref().map(|m| &m.machine_name));
            machine
        })
    });

    let anchor = create_memo(move |_| shell.with(|s| s.anchor()));
    let refresh = create_memo(move |_| shell.with(|s| s.refresh));
    let range_label = move || {
        shell.with(|s| {
            format!(
                "{} to {}",
                format_anchor_label(s.window.past, offset),
                format_anchor_label(s.window.anchor, offset)
            )
        })
    };

    let update_layout = move |f: fn(&mut LayoutPrefs)| shell.update(|s| f(&mut s.layout));

    let group_ref = create_node_ref::<html::Div>();
    let (dragging, set_dragging) = create_signal(false);
    let on_pointer_move = move |ev: ev::PointerEvent| {
        if !dragging.get_untracked() {
            return;
        }
        let Some(group) = group_ref.get_untracked() else {
            return;
        };
        let rect = group.get_bounding_client_rect();
        let (offset_px, extent) = match layout.get_untracked().orientation {
            Orientation::Horizontal => (ev.client_x() as f64 - rect.left(), rect.width()),
            Orientation::Vertical => (ev.client_y() as f64 - rect.top(), rect.height()),
        };
        shell.update(|s| s.layout.split.drag_to(offset_px, extent));
    };

    view! {
        <div class="dashboard-shell">
            <header class="shell-header">
                <div class="breadcrumb">{move || breadcrumb.get()}</div>
                <div class="toolbar">
                    <span class="muted range-label">{range_label}</span>
                    <AnchorPicker shell=shell/>
                    <button
                        class="btn ghost"
                        class:active=move || layout.get().visibility.show_table()
                        title=move || layout.get().visibility.table_tooltip()
                        on:click=move |_| update_layout(|l| l.visibility.toggle_table())
                    >
                        "Table"
                    </button>
                    <button
                        class="btn ghost"
                        class:active=move || layout.get().visibility.show_graphs()
                        title=move || layout.get().visibility.graphs_tooltip()
                        on:click=move |_| update_layout(|l| l.visibility.toggle_graphs())
                    >
                        "Graphs"
                    </button>
                    <button
                        class="btn ghost"
                        title="Switch Layout"
                        on:click=move |_| update_layout(|l| l.orientation = l.orientation.flipped())
                    >
                        {move || match layout.get().orientation {
                            Orientation::Horizontal => "Stack",
                            Orientation::Vertical => "Side by side",
                        }}
                    </button>
                </div>
            </header>
            <div
                class=move || format!("panel-group {}", layout.get().orientation.as_str())
                node_ref=group_ref
                on:pointermove=on_pointer_move
                on:pointerup=move |_| set_dragging.set(false)
                on:pointerleave=move |_| set_dragging.set(false)
            >
                <Show when=move || layout.get().visibility.show_table()>
                    <section
                        class="panel table-panel"
                        style=move || {
                            let l = layout.get();
                            let pct = if l.visibility.both() { l.split.table_pct() } else { 100.0 };
                            panel_style(pct, l.orientation)
                        }
                    >
                        <ProcessTable refresh=refresh machine=machine/>
                    </section>
                </Show>
                <Show when=move || layout.get().visibility.both()>
                    <div
                        class="resize-handle"
                        on:pointerdown=move |ev: ev::PointerEvent| {
                            ev.prevent_default();
                            set_dragging.set(true);
                        }
                    ></div>
                </Show>
                <Show when=move || layout.get().visibility.show_graphs()>
                    <section
                        class="panel graphs-panel"
                        style=move || {
                            let l = layout.get();
                            let pct = if l.visibility.both() { l.split.graphs_pct() } else { 100.0 };
                            panel_style(pct, l.orientation)
                        }
                    >
                        <MetricsPoller anchor=anchor machine=machine/>
                    </section>
                </Show>
            </div>
        </div>
    }
}
