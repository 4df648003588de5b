//! rdesk-api: HTTP service for the release submission wizard
//!
//! Serves the wizard's API routes over SQLite, stores uploads under the root
//! folder and proxies code lookups to MusicBrainz.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use rdesk_common::config::{load_config, ApprovalMode, RootFolderInitializer, RootFolderResolver};
use rdesk_common::db::init_database;
use rdesk_common::db::sessions::{
    create_session, create_user, find_user_by_email, purge_expired_sessions,
};
use rdesk_api::lookup::MusicBrainzLookup;
use rdesk_api::storage::LocalFsStore;
use rdesk_api::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "rdesk-api", version, about = "Release submission API service")]
struct Cli {
    /// Root folder holding the database and uploads
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:5780
    #[arg(long, env = "RDESK_BIND")]
    bind: Option<String>,

    /// `manual` keeps submissions pending review, `auto` publishes them
    #[arg(long, env = "RDESK_APPROVAL_MODE")]
    approval_mode: Option<ApprovalMode>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Create a user if needed and print a session token for it
    IssueToken {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        name: String,
        /// Token lifetime in days
        #[arg(long, default_value_t = 30)]
        days: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "rdesk_api={0},rdesk_common={0},tower_http={0}",
                    config.logging.level
                ))
            }),
        )
        .init();

    // Build identification first, before any database work
    info!(
        "Starting ReleaseDesk API (rdesk-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = RootFolderResolver::new("api")
        .with_cli_arg(cli.root_folder.clone())
        .with_toml(config.clone())
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());
    let pool = match init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    if let Some(Command::IssueToken { email, name, days }) = cli.command {
        let user = match find_user_by_email(&pool, &email).await? {
            Some(user) => user,
            None => create_user(&pool, &email, &name).await?,
        };
        let token = create_session(&pool, &user.id, Utc::now(), Duration::days(days)).await?;
        println!("{}", token);
        return Ok(());
    }

    match purge_expired_sessions(&pool, Utc::now()).await {
        Ok(0) => {}
        Ok(n) => info!("Purged {} expired sessions", n),
        Err(e) => warn!("Could not purge expired sessions: {}", e),
    }

    let approval_mode = cli.approval_mode.unwrap_or(config.approval_mode);
    info!("Approval mode: {:?}", approval_mode);

    let store = LocalFsStore::new(initializer.uploads_path(), config.uploads_url_prefix.clone());
    let lookup = MusicBrainzLookup::new(&config.lookup).context("Failed to build lookup client")?;

    let state = AppState::new(pool, Arc::new(store.clone()), Arc::new(lookup), approval_mode);
    let app = build_router(state, Some(&store));

    let bind = cli.bind.unwrap_or(config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("rdesk-api listening on http://{}", bind);
    info!("Health check: http://{}/health", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("rdesk-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
