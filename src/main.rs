//! SaccharumVision HTTP server
//!
//! Usage:
//! ```
//! saccharum-vision --model-path models/sugarcane_resnet50.onnx
//! saccharum-vision --config service.json --port 8080
//! ```
//!
//! The model is loaded once before the listener accepts connections. When
//! loading fails the server still starts and reports `model_loaded: false`;
//! prediction endpoints answer 503.

use clap::Parser;
use saccharum_vision::api::{AppState, create_router};
use saccharum_vision::core::{ConfigValidator, ServiceConfig, init_tracing};
use saccharum_vision::service::ClassifierService;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Command-line arguments for the classification server
#[derive(Parser)]
#[command(name = "saccharum-vision")]
#[command(about = "Sugarcane leaf disease classification API")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the ONNX model file (overrides the config file)
    #[arg(short, long)]
    model_path: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Number of ONNX Runtime sessions
    #[arg(long)]
    session_pool_size: Option<usize>,
}

impl Args {
    fn into_config(self) -> Result<ServiceConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_json_file(path)?,
            None => ServiceConfig::default(),
        };
        if let Some(model_path) = self.model_path {
            config.model_path = model_path;
        }
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(size) = self.session_pool_size {
            config.session_pool_size = size;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Args::parse().into_config()?;
    info!("Starting server...");

    let service = Arc::new(ClassifierService::from_config(&config)?);
    let loader = Arc::clone(&service);
    let load_config = config.clone();
    let loaded = tokio::task::spawn_blocking(move || loader.load_model(&load_config)).await?;
    if let Err(e) = loaded {
        warn!(
            "Model not loaded ({}), serving in degraded mode",
            e.detailed_message()
        );
    }

    let state = AppState::new(service).with_max_upload_bytes(config.max_upload_bytes);
    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
