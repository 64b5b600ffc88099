use dashboard_shell::picker::{
    format_anchor_label, format_picker_value, parse_picker_value, PICKER_PLACEHOLDER,
};
use dashboard_shell::ShellState;
use leptos::*;
use log::{info, warn};
use metrics_core::now_ms;

use crate::state::utc_offset_minutes;

/// Date/time control that pins the dashboard anchor. "Live" returns to following the clock.
#[component]
pub fn AnchorPicker(shell: RwSignal<ShellState>) -> impl IntoView {
    let (open, set_open) = create_signal(false);
    let offset = utc_offset_minutes();

    let button_label = move || {
        shell.with(|s| {
            if s.is_live() {
                PICKER_PLACEHOLDER.to_string()
            } else {
                format_anchor_label(s.anchor(), offset)
            }
        })
    };
    let input_value = move || shell.with(|s| format_picker_value(s.anchor(), offset));

    let on_change = move |ev: ev::Event| {
        let raw = event_target_value(&ev);
        match parse_picker_value(&raw, offset) {
            Some(ts) => {
                info!("anchor pinned to {}", format_anchor_label(ts, offset));
                shell.update(|s| s.pin(ts));
                set_open.set(false);
            }
            None => warn!("ignoring unparseable picker value {raw:?}"),
        }
    };

    view! {
        <div class="anchor-picker">
            <button
                class="btn ghost"
                class:active=move || !shell.with(|s| s.is_live())
                on:click=move |_| set_open.update(|o| *o = !*o)
            >
                {button_label}
            </button>
            <Show when=move || open.get()>
                <input
                    type="datetime-local"
                    class="picker-input"
                    prop:value=input_value
                    on:change=on_change
                />
            </Show>
            <button
                class="btn ghost"
                title="Follow the current time"
                disabled=move || shell.with(|s| s.is_live())
                on:click=move |_| {
                    shell.update(|s| s.resume_live(now_ms()));
                    set_open.set(false);
                }
            >
                "Live"
            </button>
        </div>
    }
}
