//! Alert browser server
//!
//! Serves the list and browse pages plus the JSON API the browse page uses.
//!
//! Usage:
//!   cargo run --features server --bin alerts_server -- \
//!     --config config/alerts_dash.yaml \
//!     --bind 127.0.0.1:8000
//!
//! Brokers come from `alert_classes` in the config file or from
//! `TOM_ALERT_DASH_CLASSES` (comma separated); MARS and ALeRCE otherwise.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tom_alerts_dash::api::{create_router, AppState, PageRenderer};
use tom_alerts_dash::{BrokerRegistry, DashConfig, InMemoryTargetStore, SessionStore};

/// Alert broker browser
#[derive(Parser, Debug)]
#[command(name = "alerts_server")]
struct Args {
    /// YAML config file
    #[arg(long, env = "TOM_ALERTS_DASH_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides the config
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DashConfig::load_from(path)?,
        None => DashConfig::load()?,
    };

    // Unresolvable broker identifiers stop the server here
    let registry = BrokerRegistry::from_config(&config)?;

    let mut store = InMemoryTargetStore::new();
    if let Some(prefix) = &config.target_url_prefix {
        store = store.with_url_prefix(prefix.clone());
    }

    let state = AppState {
        sessions: Arc::new(SessionStore::new(Arc::new(registry), Arc::new(store))),
        pages: Arc::new(PageRenderer::new()?),
    };

    let app = create_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = args.bind.as_deref().unwrap_or(config.bind_addr.as_str()).parse()?;
    tracing::info!(%addr, "alerts_server listening");
    tracing::info!("browse alerts at http://{}/alerts/browse/", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
