//! ZoneScout web server
//!
//! Usage:
//!   zonescout-web [--config zonescout.toml] [--host 127.0.0.1] [--port 8501]
//!
//! Environment:
//!   GOOGLE_API_KEY, GROQ_API_KEY - required
//!   AI_STUDIO_KEY                - optional, enables map screenshots
//!   RUST_LOG                     - log filter (default: zonescout=info,tower_http=info)

use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use zonescout::utils::{logger, validation::Validate};
use zonescout::web::{create_router, AppState};
use zonescout::{ApiKeys, ScoutConfig, ScoutServices};

#[derive(Debug, Parser)]
#[command(name = "zonescout-web")]
#[command(about = "Serve the ZoneScout browser UI")]
struct WebArgs {
    #[arg(short, long, help = "TOML configuration file")]
    config: Option<String>,

    #[arg(long, help = "Bind address (overrides server.host)")]
    host: Option<String>,

    #[arg(short, long, help = "Port (overrides server.port)")]
    port: Option<u16>,

    #[arg(long, help = "Emit JSON log lines")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = WebArgs::parse();

    let mut config = ScoutConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.server.json_logs |= args.json_logs;

    logger::init_server_logger(config.server.json_logs);
    config.validate()?;

    let keys = ApiKeys::from_env();
    let services = match ScoutServices::from_config(&config, &keys) {
        Ok(services) => services.with_geocode_cache(),
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    if !services.vision_enabled() {
        warn!("⚠️ AI_STUDIO_KEY not set, map screenshot upload is disabled");
    }

    // 主機名稱（例如 localhost）交給 bind 解析
    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    let addr = listener.local_addr()?;
    let state = Arc::new(AppState::new(services, config));
    let app = create_router(state);

    info!("🎯 ZoneScout starting on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /                - Zone form");
    info!("  POST /zone/pincode    - Lock zone from pincode");
    info!("  POST /zone/image      - Lock zone from map screenshot");
    info!("  POST /scout           - Search and audit leads");
    info!("  POST /api/v1/zone     - JSON zone lookup");
    info!("  POST /api/v1/scout    - JSON scouting run");
    info!("  GET  /health          - Health check");
    info!("Press Ctrl+C for graceful shutdown");

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("👋 ZoneScout shutdown complete");
    Ok(())
}
