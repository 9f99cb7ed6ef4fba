//! songchain-server - Song registry front-end for a Blockchain-as-a-Service API
//!
//! Registers songs with the BaaS, tracks them in memory, and updates their
//! status when the BaaS calls back through the notification webhook.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use songchain_common::config::{ConfigFile, Overrides, Settings, TomlConfig};
use songchain_server::services::BaasClient;
use songchain_server::store::InMemorySongStore;
use songchain_server::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for songchain-server
#[derive(Parser, Debug)]
#[command(name = "songchain-server")]
#[command(about = "Song registry front-end for a blockchain notarization API")]
#[command(version)]
struct Args {
    /// Optional TOML config file
    #[arg(short, long, env = "SONGCHAIN_CONFIG")]
    config: Option<PathBuf>,

    /// BaaS API base URL
    #[arg(long, env = "BLOCKAPI_BASE_URL")]
    baas_base_url: Option<String>,

    /// BaaS API key (sent as X-API-Key)
    #[arg(long, env = "BLOCKAPI_API_KEY", hide_env_values = true)]
    baas_api_key: Option<String>,

    /// Public URL of this server's webhook, as registered with the BaaS
    #[arg(long, env = "WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// Shared secret for webhook signatures
    #[arg(long, env = "SONGCHAIN_WEBHOOK_SECRET", hide_env_values = true)]
    webhook_secret: Option<String>,

    /// Secret used to sign session cookies
    #[arg(long, env = "SONGCHAIN_SESSION_SECRET", hide_env_values = true)]
    session_secret: Option<String>,

    /// Host to bind
    #[arg(long, env = "SONGCHAIN_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            baas_base_url: self.baas_base_url.clone(),
            baas_api_key: self.baas_api_key.clone(),
            webhook_url: self.webhook_url.clone(),
            webhook_secret: self.webhook_secret.clone(),
            session_secret: self.session_secret.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_file = match &args.config {
        Some(path) => Some(TomlConfig::load(path)?),
        None => None,
    };
    let unreadable = match &config_file {
        Some(ConfigFile::Unreadable(reason)) => Some(reason.clone()),
        _ => None,
    };
    let file_config = config_file.map(ConfigFile::into_config).unwrap_or_default();
    let settings = Settings::resolve(args.overrides(), file_config);

    // RUST_LOG wins over the config file's log_level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "songchain_server={level},songchain_common={level},tower_http={level}",
                    level = settings.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting songchain-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let (Some(path), Some(reason)) = (&args.config, &unreadable) {
        warn!(
            path = %path.display(),
            error = %reason,
            "Config file not readable, using defaults"
        );
    }

    info!("BaaS API: {}", settings.baas_base_url);
    if settings.baas_api_key.is_none() {
        warn!("No BaaS API key configured; upstream calls will be rejected");
    }
    match &settings.webhook_url {
        Some(url) => info!("Webhook URL advertised to BaaS: {}", url),
        None => info!("No webhook URL configured; register /webhook/blockchain-notification with the BaaS manually"),
    }
    if settings.webhook_secret.is_none() {
        warn!("No webhook secret configured; webhook accepts unsigned notifications from any caller");
    }
    if settings.session_secret_is_default {
        warn!("Using development session secret; set SONGCHAIN_SESSION_SECRET in production");
    }

    let baas = BaasClient::new(&settings.baas_base_url, settings.baas_api_key.clone())
        .context("Failed to create BaaS client")?;
    let state = AppState::new(
        Arc::new(InMemorySongStore::new()),
        baas,
        settings.webhook_secret.clone(),
        &settings.session_secret,
    );
    let app = build_router(state);

    let bind_addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    info!("songchain-server listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

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
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
