//! HTTP server for the vegetation analysis API

mod config;
mod logging;

use anyhow::Context;
use axum::{http::HeaderValue, Router};
use clap::Parser;
use config::{AppConfig, ServerConfig};
use std::path::PathBuf;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use vegetation_service::VegetationServiceModule;

#[derive(Parser, Debug)]
#[command(name = "vegetation-server")]
#[command(version, about = "NDVI vegetation analysis over Google Earth Engine")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::load(cli.config.as_deref())?;

    if cli.print_config {
        print!("{}", serde_yaml::to_string(&cfg)?);
        return Ok(());
    }

    logging::init(&cfg.logging)?;

    let module = VegetationServiceModule::new(cfg.vegetation.clone());
    module.init()?;

    let app = module
        .register_rest(Router::new())?
        .layer(cors_layer(&cfg.server)?)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.bind_addr))?;
    tracing::info!(addr = %listener.local_addr()?, "Vegetation server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Vegetation server stopped");
    Ok(())
}

fn cors_layer(cfg: &ServerConfig) -> anyhow::Result<CorsLayer> {
    if cfg.cors_allowed_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }
    let origins = cfg
        .cors_allowed_origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin '{}'", o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
