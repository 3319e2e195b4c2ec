use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use relaypost::config::{Config, StoreKind};
use relaypost::server::{self, AppState};

const DEFAULT_LOG_FILTER: &str = "relaypost=info,tower_http=info";

#[derive(Parser)]
#[command(name = "relaypost")]
#[command(version, about = "Mirror Slack channels into a GraphQL collaboration API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the webhook server
    Serve(ConfigArgs),

    /// Load and validate the configuration, then exit
    CheckConfig(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// Path to the YAML config file
    #[arg(short, long, default_value = "relaypost.yaml", env = "RELAYPOST_CONFIG")]
    config: PathBuf,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::CheckConfig(args) => check_config(args).await,
    }
}

async fn load_config(args: &ConfigArgs) -> Result<Config> {
    let mut config = Config::load(&args.config)
        .await
        .with_context(|| format!("loading {}", args.config.display()))?;
    config.apply_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    Ok(config)
}

async fn serve(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args).await?;
    let state = AppState::from_config(&config)
        .await
        .context("invalid configuration")?;

    if config.channels.is_empty() {
        warn!("No channels configured; every message will be skipped");
    }
    if state.verifier.is_none() {
        warn!("Slack signing secret not set; request verification disabled");
    }

    let app = server::build_app(state, config.server.request_timeout_seconds);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(
        %addr,
        channels = config.channels.len(),
        store = ?config.store.kind,
        "Listening for Slack events"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn check_config(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args).await?;
    config.validate().context("invalid configuration")?;

    println!("config: {}", args.config.display());
    println!("listen: {}:{}", config.server.host, config.server.port);
    println!("channels: {}", config.channels.len());
    let store = match config.store.kind {
        StoreKind::None => "none (replies are skipped)".to_string(),
        StoreKind::Memory => "memory".to_string(),
        StoreKind::File => format!("file ({})", config.store.path.display()),
    };
    println!("store: {store}");
    println!(
        "signature verification: {}",
        if config.slack.signing_secret.is_some() {
            "enabled"
        } else {
            "disabled"
        }
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutting down");
}
