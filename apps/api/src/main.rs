mod config;
mod errors;
mod layout;
mod models;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::layout::default_page_config;
use crate::render::{FontAssets, MealPlanRenderer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting meal plan export service v{}", env!("CARGO_PKG_VERSION"));

    // Provision font metrics once; the renderer falls back to built-in metrics if this fails.
    let fonts = Arc::new(FontAssets::new(
        config.font_source_dir.clone(),
        config.font_runtime_dir.clone(),
    ));
    match fonts.ensure_available() {
        Ok(()) => info!("Font resources ready in {}", fonts.runtime_dir().display()),
        Err(e) => warn!("Font resources unavailable, built-in metrics will be used: {e}"),
    }

    let page_config = default_page_config();
    info!(
        "Page config: {}x{}pt, {}pt margins",
        page_config.width, page_config.height, page_config.margin_top
    );

    let state = AppState {
        renderer: MealPlanRenderer::new(fonts, page_config),
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: restrict origins to the web app domain
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
