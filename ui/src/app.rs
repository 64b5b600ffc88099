use leptos::*;
use leptos_meta::*;
use leptos_router::*;

use crate::shell::DashboardShell;
use crate::state::{load_config, provide_app_ctx, use_app_ctx};
use crate::theme::GLOBAL_CSS;

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    let ctx = provide_app_ctx(load_config());
    let shell_path = ctx.config.with_untracked(|c| c.shell_route());

    view! {
        <Style>{GLOBAL_CSS}</Style>
        <Title text="Statistics"/>
        <Router>
            <div class="app">
                <MachineNav/>
                <main class="content">
                    <Routes>
                        <Route path=shell_path view=DashboardShell/>
                        <Route path="/*any" view=MachineIndex/>
                    </Routes>
                </main>
            </div>
        </Router>
    }
}

/// Sidebar of every machine in the route table.
#[component]
fn MachineNav() -> impl IntoView {
    let ctx = use_app_ctx();
    let (root, links) = ctx.config.with_untracked(|c| {
        (
            c.root_prefix().to_string(),
            c.routes.machines(),
        )
    });

    view! {
        <nav class="sidebar">
            <div class="section-label">"Machines"</div>
            {links
                .into_iter()
                .map(|link| {
                    let href = format!("{root}/{}", link.path);
                    view! {
                        <A href=href class="nav-link" active_class="active">
                            {link.label}
                        </A>
                    }
                })
                .collect_view()}
        </nav>
    }
}

#[component]
fn MachineIndex() -> impl IntoView {
    let ctx = use_app_ctx();
    let empty = ctx.config.with_untracked(|c| c.routes.is_empty());
    view! {
        <div class="placeholder">
            {if empty { "No machines configured" } else { "Select a machine" }}
        </div>
    }
}
