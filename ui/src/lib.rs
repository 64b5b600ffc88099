pub mod app;
pub mod chart;
pub mod picker;
pub mod poller;
pub mod shell;
pub mod state;
pub mod table;
pub mod theme;

pub use app::App;

#[cfg(all(any(feature = "csr", feature = "hydrate"), target_arch = "wasm32"))]
use leptos::*;
#[cfg(all(any(feature = "csr", feature = "hydrate"), target_arch = "wasm32"))]
use wasm_bindgen::prelude::*;

#[cfg(all(any(feature = "csr", feature = "hydrate"), target_arch = "wasm32"))]
fn init_browser() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) is harmless.
    let _ = console_log::init_with_level(log::Level::Info);
}

#[cfg(all(feature = "csr", target_arch = "wasm32"))]
#[wasm_bindgen]
pub fn start() {
    init_browser();
    leptos::mount_to_body(|| view! { <App/> });
}

#[cfg(all(feature = "hydrate", target_arch = "wasm32"))]
#[wasm_bindgen]
pub fn hydrate() {
    init_browser();
    leptos::mount_to_body(|| view! { <App/> });
}
