//! s2i-ui - Converter front-end service
//!
//! Serves the interactive SHP→IMDF workflow: import review, the
//! configuration wizard, the feature review/edit screen, and the
//! validation/export handshake. All conversion work happens in the
//! converter backend; this service owns the session-scoped workflow
//! state and the browser-facing API.

use anyhow::Result;
use clap::Parser;
use s2i_common::config::{resolve_service_config, TomlConfig};
use s2i_common::events::EventBus;
use s2i_ui::services::HttpConverterClient;
use s2i_ui::AppState;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Parser)]
#[command(name = "s2i-ui", about = "SHP→IMDF converter front-end service")]
struct Args {
    /// Converter backend base URL
    #[arg(long, env = "S2I_BACKEND_URL")]
    backend_url: Option<String>,

    /// Listen port
    #[arg(long, env = "S2I_PORT")]
    port: Option<u16>,

    /// Explicit TOML config file path
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Starting s2i-ui (converter front end)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let toml_config = match &args.config {
        Some(path) => TomlConfig::load(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path.display(), e))?,
        None => TomlConfig::load_default(),
    };
    let config = resolve_service_config(args.backend_url.as_deref(), args.port, &toml_config)?;
    info!("Converter backend: {}", config.backend_url);

    let client = HttpConverterClient::new(&config.backend_url)
        .map_err(|e| anyhow::anyhow!("Failed to build converter client: {}", e))?;
    let event_bus = EventBus::new(256);
    let state = AppState::with_backend(client, event_bus);

    let mut app = s2i_ui::build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Serve the built browser frontend when configured.
    if let Some(static_dir) = &config.static_dir {
        if static_dir.exists() {
            info!("Serving static frontend from {}", static_dir.display());
            app = app.fallback_service(tower_http::services::ServeDir::new(static_dir));
        } else {
            tracing::warn!(path = %static_dir.display(), "Static frontend directory missing; skipping");
        }
    }

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", config.port)).await?;
    info!("Listening on http://127.0.0.1:{}", config.port);
    info!("Health check: http://127.0.0.1:{}/health", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
