use dashboard_shell::DashboardConfig;
use leptos::*;
use log::warn;
use query_client::QueryConfig;

#[cfg(target_arch = "wasm32")]
use js_sys::Reflect;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[derive(Clone)]
pub struct AppCtx {
    pub config: RwSignal<DashboardConfig>,
}

impl AppCtx {
    pub fn query_config(&self) -> QueryConfig {
        self.config.with_untracked(|c| {
            QueryConfig::new(c.api_base.clone()).with_window_secs(c.window_secs)
        })
    }
}

pub fn provide_app_ctx(config: DashboardConfig) -> AppCtx {
    let ctx = AppCtx {
        config: create_rw_signal(config),
    };
    provide_context(ctx.clone());
    ctx
}

pub fn use_app_ctx() -> AppCtx {
    use_context::<AppCtx>().expect("AppCtx not provided")
}

#[cfg(target_arch = "wasm32")]
fn read_global(key: &str) -> Option<String> {
    Reflect::get(&js_sys::global(), &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_string())
}

/// Page globals in the browser, environment natively; defaults on any error.
pub fn load_config() -> DashboardConfig {
    #[cfg(target_arch = "wasm32")]
    {
        use dashboard_shell::config::{API_BASE_ENV, CONFIG_ENV};

        let cfg = match read_global(CONFIG_ENV) {
            Some(json) => DashboardConfig::from_json(&json).unwrap_or_else(|err| {
                warn!("{err}; using defaults");
                DashboardConfig::default()
            }),
            None => DashboardConfig::default(),
        };
        match read_global(API_BASE_ENV) {
            Some(base) => cfg.with_api_base(base),
            None => cfg,
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        DashboardConfig::from_env().unwrap_or_else(|err| {
            warn!("{err}; using defaults");
            DashboardConfig::default()
        })
    }
}

/// `Date.getTimezoneOffset()` in the browser; UTC elsewhere.
pub fn utc_offset_minutes() -> i64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::new_0().get_timezone_offset() as i64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        0
    }
}
