#[cfg(feature = "ssr")]
mod server {
    use std::error::Error;

    use axum::Router;
    use leptos::*;
    use leptos_axum::{generate_route_list, LeptosRoutes};
    use log::info;
    use ui::App;

    pub async fn run() -> Result<(), Box<dyn Error>> {
        simple_logger::SimpleLogger::new()
            .with_level(log::LevelFilter::Info)
            .env()
            .init()?;

        let conf = get_configuration(None).await?;
        let leptos_options = conf.leptos_options;
        let addr = leptos_options.site_addr;
        let routes = generate_route_list(App);

        let app = Router::new()
            .leptos_routes(&leptos_options, routes, App)
            .with_state(leptos_options);

        info!("dashboard listening on http://{addr}");
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() {
    if let Err(err) = server::run().await {
        eprintln!("dashboard server failed: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "ssr"))]
fn main() {}
