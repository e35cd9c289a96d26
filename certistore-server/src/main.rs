//! certistore-server - certificate portfolio service
//!
//! Serves the certificate API and stored files. Zero-config startup: the root
//! folder, database and storage directory are created on first run.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use certistore_common::config::{self, RootFolderInitializer, TomlConfig};
use certistore_common::db::{self, SqliteRecordStore, SqliteSessionProvider};
use certistore_common::storage::{FsObjectStore, PublicUrls};
use certistore_common::{CertificateService, PrincipalId};
use chrono::FixedOffset;
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use certistore_server::{build_router, AppState};

/// Command-line arguments for certistore-server
#[derive(Parser, Debug)]
#[command(name = "certistore-server")]
#[command(about = "Certificate portfolio service")]
#[command(version)]
struct Args {
    /// Root folder holding the database and stored files
    #[arg(short, long, global = true)]
    root_folder: Option<PathBuf>,

    /// Path to config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "CERTISTORE_PORT")]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create a session for a principal and print its bearer token
    IssueSession {
        /// Principal identifier the session authenticates as
        #[arg(long)]
        principal: String,
        /// Session lifetime in hours (never expires when omitted)
        #[arg(long)]
        ttl_hours: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = config::config_file_path(args.config.as_deref());
    let toml_config = TomlConfig::load_or_default(config_path.as_deref());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("certistore={0},tower_http={0}", toml_config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting certistore-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file found; using defaults"),
    }

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;
    info!("Root folder: {}", initializer.root_folder().display());

    let pool = db::init_database(&initializer.database_path())
        .await
        .context("Failed to open database")?;

    match args.command.unwrap_or(Command::Serve) {
        Command::IssueSession {
            principal,
            ttl_hours,
        } => {
            let ttl = ttl_hours.map(chrono::Duration::hours);
            let token = db::issue_session(&pool, &PrincipalId::new(principal), ttl).await?;
            println!("{}", token);
            Ok(())
        }
        Command::Serve => serve(args.port, toml_config, initializer, pool).await,
    }
}

async fn serve(
    port: Option<u16>,
    config: TomlConfig,
    initializer: RootFolderInitializer,
    pool: sqlx::SqlitePool,
) -> Result<()> {
    let port = port.unwrap_or(config.port);
    let storage_root = initializer.storage_path();
    let urls = PublicUrls::new(&config.resolved_public_base_url(port), &config.bucket);
    let files_path = urls
        .base_path()
        .context("public_base_url is not a valid URL")?;
    info!("Serving files from {} as {}", storage_root.display(), urls.url_for("{key}"));

    let certificates = CertificateService::new(
        Arc::new(SqliteRecordStore::new(pool.clone())),
        Arc::new(FsObjectStore::new(storage_root.clone(), urls)),
    );
    let sessions = Arc::new(SqliteSessionProvider::new(pool));

    let display_offset = FixedOffset::east_opt(config.utc_offset_minutes * 60)
        .context("utc_offset_minutes out of range")?;

    let state = AppState::new(certificates, sessions, storage_root)
        .with_display_offset(display_offset)
        .with_files_path(&files_path)
        .with_max_upload_bytes(config.max_upload_bytes);
    let app = build_router(state);

    let addr = format!("{}:{}", config.bind_addr, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("certistore-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

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
            Ok(mut stream) => {
                stream.recv().await;
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
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
