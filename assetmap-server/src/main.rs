//! assetmap-server - Asset map service
//!
//! Serves the asset REST API and browser UI. Assets are kept either in
//! memory or in a JSON ledger file under the root folder.

use std::path::PathBuf;

use anyhow::{Context, Result};
use assetmap_common::config::{load_toml_config, RootFolderInitializer, StorageMode};
use assetmap_server::config::{CliOverrides, ServerConfig};
use assetmap_server::store::AssetStore;
use assetmap_server::{build_router, AppState};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for assetmap-server
#[derive(Parser, Debug)]
#[command(name = "assetmap-server")]
#[command(about = "Company asset map service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "ASSETMAP_PORT")]
    port: Option<u16>,

    /// IP address to bind
    #[arg(short, long, env = "ASSETMAP_BIND")]
    bind: Option<String>,

    /// Root folder holding the ledger file
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Storage backend: memory or file
    #[arg(short, long, env = "ASSETMAP_STORAGE")]
    storage: Option<StorageMode>,

    /// TOML bootstrap config file
    #[arg(short, long, env = "ASSETMAP_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = load_toml_config(args.config.as_deref())
        .context("Failed to load configuration file")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{},tower_http=info", loaded.config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting assetmap-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Configuration: {}", loaded.source);

    let overrides = CliOverrides {
        port: args.port,
        bind_address: args.bind,
        root_folder: args.root_folder,
        storage: args.storage,
    };
    let config = ServerConfig::resolve(overrides, &loaded.config)
        .context("Invalid server configuration")?;

    let store = match config.storage {
        StorageMode::Memory => AssetStore::in_memory(),
        StorageMode::File => {
            let initializer = RootFolderInitializer::new(config.root_folder.clone());
            initializer
                .ensure_directory_exists()
                .context("Failed to prepare root folder")?;
            info!("Root folder: {}", initializer.root_folder().display());
            info!("Ledger file: {}", config.ledger_path.display());
            AssetStore::with_json_file(&config.ledger_path)
                .context("Failed to load asset ledger")?
        }
    };
    info!("Storage: {}", store.backend_description());

    let state = AppState::new(store).with_max_upload_bytes(config.max_upload_bytes);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;
    info!("assetmap-server listening on http://{}", config.listen_addr);
    info!("Health check: http://{}/health", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
